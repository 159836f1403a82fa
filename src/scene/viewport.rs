use crate::config::{
    DEFAULT_PIXELS_PER_UNIT, MAX_PIXELS_PER_UNIT, MIN_PIXELS_PER_UNIT, SCREEN_HEIGHT, SCREEN_WIDTH,
    ZOOM_STEP,
};
use crate::math::Vec2;

/// Mapping between graph coordinates and screen pixels.
///
/// The graph origin sits at the centre of the screen and +y points up,
/// while pixel rows grow downwards.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
    /// Zoom level, kept within `[MIN_PIXELS_PER_UNIT, MAX_PIXELS_PER_UNIT]`
    pub pixels_per_unit: f32,
}

impl Default for Viewport {
    fn default() -> Self {
        Self::new(SCREEN_WIDTH, SCREEN_HEIGHT)
    }
}

impl Viewport {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            pixels_per_unit: DEFAULT_PIXELS_PER_UNIT,
        }
    }

    pub fn to_pixels(&self, p: Vec2) -> [f32; 2] {
        let ppu = self.pixels_per_unit as f64;
        Vec2::new(
            p.x * ppu + 0.5 * self.width as f64,
            -p.y * ppu + 0.5 * self.height as f64,
        )
        .to_f32()
    }

    pub fn to_coords(&self, pixel: [f32; 2]) -> Vec2 {
        let ppu = self.pixels_per_unit as f64;
        Vec2::new(
            (pixel[0] as f64 - 0.5 * self.width as f64) / ppu,
            -(pixel[1] as f64 - 0.5 * self.height as f64) / ppu,
        )
    }

    /// Zoom by `ZOOM_STEP` per wheel notch; negative notches zoom out
    pub fn zoom(&mut self, wheel: f32) {
        self.pixels_per_unit = (self.pixels_per_unit * ZOOM_STEP.powf(wheel))
            .clamp(MIN_PIXELS_PER_UNIT, MAX_PIXELS_PER_UNIT);
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        log::info!("Viewport resized to {}x{}", width, height);
        self.width = width;
        self.height = height;
    }

    /// Graph-space half width and half height of the visible area
    pub fn visible_half_extent(&self) -> Vec2 {
        let ppu = self.pixels_per_unit as f64;
        Vec2::new(
            0.5 * self.width as f64 / ppu,
            0.5 * self.height as f64 / ppu,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::IsApprox;

    #[test]
    fn test_origin_maps_to_screen_centre() {
        let viewport = Viewport::default();
        assert_eq!(viewport.to_pixels(Vec2::ZERO), [600.0, 400.0]);
    }

    #[test]
    fn test_y_axis_points_up() {
        let viewport = Viewport::default();
        let [x, y] = viewport.to_pixels(Vec2::new(1.0, 1.0));
        assert_eq!(x, 620.0);
        assert_eq!(y, 380.0, "positive y must be above the centre");
    }

    #[test]
    fn test_pixel_coordinate_round_trip() {
        let mut viewport = Viewport::default();
        viewport.zoom(7.0);
        let p = Vec2::new(-3.25, 2.5);
        let back = viewport.to_coords(viewport.to_pixels(p));
        assert!(back.is_approx_tol(&p, 1e-4), "{} vs {}", back, p);
    }

    #[test]
    fn test_zoom_is_clamped() {
        let mut viewport = Viewport::default();
        viewport.zoom(-10.0);
        assert_eq!(viewport.pixels_per_unit, MIN_PIXELS_PER_UNIT);
        viewport.zoom(1000.0);
        assert_eq!(viewport.pixels_per_unit, MAX_PIXELS_PER_UNIT);
    }

    #[test]
    fn test_visible_half_extent() {
        let viewport = Viewport::default();
        assert_eq!(viewport.visible_half_extent(), Vec2::new(30.0, 20.0));
    }

    #[test]
    fn test_resize_moves_origin_and_extent() {
        let mut viewport = Viewport::default();
        viewport.resize(400, 200);
        assert_eq!(viewport.to_pixels(Vec2::ZERO), [200.0, 100.0]);
        assert_eq!(viewport.visible_half_extent(), Vec2::new(10.0, 5.0));
    }
}
