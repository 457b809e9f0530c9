use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

use radiometry::color::Color;

/// Row-major film of linear colors.
pub struct Image {
    width: u32,
    height: u32,
    pixels: Vec<Color>,
}

impl Image {
    pub fn from_rows(width: u32, rows: Vec<Vec<Color>>) -> Self {
        let height = rows.len() as u32;
        let pixels: Vec<Color> = rows.into_iter().flatten().collect();
        debug_assert_eq!(pixels.len(), (width * height) as usize);
        Image {
            width,
            height,
            pixels,
        }
    }

    /// Gamma-encoded 8-bit RGB bytes, row by row.
    pub fn to_bytes(&self) -> Vec<u8> {
        self.pixels
            .iter()
            .flat_map(|c| c.gamma_encode().to_u8())
            .collect()
    }

    pub fn write_png(&self, path: &Path) -> Result<(), png::EncodingError> {
        let file = File::create(path)?;
        let w = BufWriter::new(file);

        let mut encoder = png::Encoder::new(w, self.width, self.height);
        encoder.set_color(png::ColorType::RGB);
        encoder.set_depth(png::BitDepth::Eight);
        let mut writer = encoder.write_header()?;
        writer.write_image_data(&self.to_bytes())
    }
}
