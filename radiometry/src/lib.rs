/// RGB color used both as reflectance and as radiance.
pub mod color;
