mod arena;
mod config;
mod context;
mod local;
mod pattern;
mod recursive;

use light::Sample;
use radiometry::color::Color;
use shape::Hit;

pub use arena::{Arena, Pool, Scratch};
pub use config::{ShadeStats, TraceConfig};
pub use context::ShadeContext;
pub use local::{LocalModel, LocalOnly};
pub use pattern::{Pattern, TexturePattern};
pub use recursive::{fresnel_dielectric, fresnel_schlick, Recursive};

/// What remains of the recursion budget of a ray.
///  - `remaining`: reflection/transmission generations that may still be spawned,
///  - `internal`: bounces still allowed inside a transparent object.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Depth {
    pub remaining: u32,
    pub internal: u32,
}

impl Depth {
    pub fn new(remaining: u32, internal: u32) -> Self {
        Depth {
            remaining,
            internal,
        }
    }

    /// The budget of a child ray spawned from this one, or `None` if the budget is spent.
    pub fn deeper(self) -> Option<Self> {
        self.remaining.checked_sub(1).map(|remaining| Depth {
            remaining,
            ..self
        })
    }

    /// The budget of a ray reflected off the inside of a transparent object. Spends both counters,
    /// so either one running out stops the bounce.
    pub fn bounce_inside(self) -> Option<Self> {
        let remaining = self.remaining.checked_sub(1)?;
        let internal = self.internal.checked_sub(1)?;
        Some(Depth {
            remaining,
            internal,
        })
    }
}

pub trait Material: Sync + Send {
    /// Computes the color seen along `hit.view` at the hit. Implementations that reflect or
    /// transmit light trace further rays through `ctx`, spending `depth`.
    fn shade<'s>(
        &self,
        hit: &mut Hit<'s>,
        ctx: &mut ShadeContext<'s, '_>,
        depth: Depth,
        sample: Sample,
    ) -> Color;

    fn summary(&self) -> String;
}

#[cfg(test)]
mod test {
    use super::Depth;

    #[test]
    fn depth_budget() {
        let d = Depth::new(1, 2);
        let child = d.deeper().unwrap();
        assert_eq!(child, Depth::new(0, 2));
        assert!(child.deeper().is_none());
        assert_eq!(d.bounce_inside(), Some(Depth::new(0, 1)));
        assert!(child.bounce_inside().is_none());
        assert!(Depth::new(3, 0).bounce_inside().is_none());
    }
}
