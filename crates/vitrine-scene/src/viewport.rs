//! Render surface dimensions

/// Surface size in logical pixels plus the display scale factor
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub width: f32,
    pub height: f32,
    pub scale_factor: f32,
}

impl Viewport {
    pub fn new(width: f32, height: f32, scale_factor: f32) -> Self {
        Self {
            width,
            height,
            scale_factor: if scale_factor > 0.0 { scale_factor } else { 1.0 },
        }
    }

    pub fn from_physical(width: u32, height: u32, scale_factor: f64) -> Self {
        let scale = if scale_factor > 0.0 { scale_factor } else { 1.0 };
        Self::new(
            (width as f64 / scale) as f32,
            (height as f64 / scale) as f32,
            scale as f32,
        )
    }

    pub fn physical_size(&self) -> (u32, u32) {
        (
            (self.width * self.scale_factor).round().max(1.0) as u32,
            (self.height * self.scale_factor).round().max(1.0) as u32,
        )
    }

    pub fn is_empty(&self) -> bool {
        self.width <= 0.0 || self.height <= 0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn physical_round_trip() {
        let vp = Viewport::from_physical(2400, 1600, 2.0);
        assert_eq!((vp.width, vp.height), (1200.0, 800.0));
        assert_eq!(vp.physical_size(), (2400, 1600));
    }

    #[test]
    fn bad_scale_factor_defaults_to_one() {
        let vp = Viewport::new(800.0, 600.0, 0.0);
        assert_eq!(vp.scale_factor, 1.0);
        assert!(Viewport::new(0.0, 600.0, 1.0).is_empty());
    }
}
