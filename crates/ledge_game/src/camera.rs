//! Camera that eases toward the player and the viewport rectangle it shows.

use glam::Vec2;
use ledge_map::Aabb;

pub const DEFAULT_CAMERA_LAG: f32 = 30.0;

/// Side-scrolling camera. `scroll` is the world position of the viewport's
/// top-left corner.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Camera {
    pub scroll: Vec2,
    pub viewport: Vec2,
    /// Divisor applied to the remaining distance each tick; larger is lazier.
    pub lag: f32,
}

impl Camera {
    pub fn new(viewport_width: u32, viewport_height: u32) -> Self {
        Self {
            scroll: Vec2::ZERO,
            viewport: Vec2::new(viewport_width as f32, viewport_height as f32),
            lag: DEFAULT_CAMERA_LAG,
        }
    }

    fn target_for(&self, focus: Vec2) -> Vec2 {
        focus - self.viewport * 0.5
    }

    /// Ease one tick toward centering `focus`.
    pub fn follow(&mut self, focus: Vec2) {
        let lag = self.lag.max(1.0);
        self.scroll += (self.target_for(focus) - self.scroll) / lag;
    }

    pub fn snap_to(&mut self, focus: Vec2) {
        self.scroll = self.target_for(focus);
    }

    /// Scroll rounded to whole pixels for drawing.
    pub fn render_scroll(&self) -> (i32, i32) {
        (self.scroll.x as i32, self.scroll.y as i32)
    }

    pub fn view_rect(&self) -> Aabb {
        Aabb::from_pos_size(self.scroll, self.viewport)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn follow_closes_one_lag_fraction() {
        let mut camera = Camera::new(320, 240);
        camera.follow(Vec2::new(460.0, 120.0));
        // target scroll is (300, 0)
        assert!((camera.scroll.x - 10.0).abs() < 1e-5);
        assert_eq!(camera.scroll.y, 0.0);
    }

    #[test]
    fn follow_converges() {
        let mut camera = Camera::new(320, 240);
        let focus = Vec2::new(1000.0, 500.0);
        for _ in 0..1000 {
            camera.follow(focus);
        }
        assert!((camera.scroll - Vec2::new(840.0, 380.0)).length() < 0.01);
    }

    #[test]
    fn snap_centers_focus() {
        let mut camera = Camera::new(320, 240);
        camera.snap_to(Vec2::new(100.0, 100.0));
        assert_eq!(camera.view_rect().center(), Vec2::new(100.0, 100.0));
    }
}
