//! Raster surface: the erasable overlay and its coverage estimator
//!
//! The surface is the model-side twin of the on-screen canvas. Erase strokes
//! are mirrored here so coverage can be computed without reading pixels back
//! from the canvas.

use glam::Vec2;

/// Bytes per RGBA sample
const BYTES_PER_SAMPLE: usize = 4;
/// Offset of the alpha channel within a sample
const ALPHA_OFFSET: usize = 3;

/// A width x height grid of RGBA samples representing the scratch overlay.
///
/// Mutated by erase strokes, reset on session re-initialization. A sample is
/// "erased" only when its alpha is exactly zero.
#[derive(Debug, Clone)]
pub struct RasterSurface {
    width: u32,
    height: u32,
    data: Vec<u8>,
}

impl RasterSurface {
    /// Create a fully-opaque surface.
    pub fn new(width: u32, height: u32) -> Self {
        let len = width as usize * height as usize * BYTES_PER_SAMPLE;
        Self {
            width,
            height,
            data: vec![0xFF; len],
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Alpha of the sample at (x, y). Out-of-bounds reads return full opacity.
    pub fn alpha_at(&self, x: u32, y: u32) -> u8 {
        if x >= self.width || y >= self.height {
            return 0xFF;
        }
        let idx = (y as usize * self.width as usize + x as usize) * BYTES_PER_SAMPLE;
        self.data[idx + ALPHA_OFFSET]
    }

    /// Punch a circular transparent hole centered at `center`, clipped to
    /// surface bounds. Re-erasing already-erased samples is a no-op.
    pub fn erase(&mut self, center: Vec2, radius: f32) {
        if self.width == 0 || self.height == 0 || radius <= 0.0 {
            return;
        }

        // Bounding box of the stroke, clamped to the surface
        let min_x = (center.x - radius).floor().max(0.0) as u32;
        let min_y = (center.y - radius).floor().max(0.0) as u32;
        let max_x = ((center.x + radius).ceil() as i64).clamp(0, self.width as i64 - 1) as u32;
        let max_y = ((center.y + radius).ceil() as i64).clamp(0, self.height as i64 - 1) as u32;
        if center.x + radius < 0.0 || center.y + radius < 0.0 {
            return;
        }

        let r_sq = radius * radius;
        for y in min_y..=max_y {
            for x in min_x..=max_x {
                let d = Vec2::new(x as f32, y as f32) - center;
                if d.length_squared() <= r_sq {
                    let idx =
                        (y as usize * self.width as usize + x as usize) * BYTES_PER_SAMPLE;
                    self.data[idx + ALPHA_OFFSET] = 0;
                }
            }
        }
    }

    /// Erase the entire surface (used when an exhausted offer is shown with
    /// no scratching required).
    pub fn erase_all(&mut self) {
        for sample in self.data.chunks_exact_mut(BYTES_PER_SAMPLE) {
            sample[ALPHA_OFFSET] = 0;
        }
    }

    /// Restore full opacity.
    pub fn reset(&mut self) {
        self.data.fill(0xFF);
    }

    /// Percentage of samples whose alpha is exactly zero, in [0, 100].
    ///
    /// Recomputed in full on every call; O(width x height). Side-effect free.
    pub fn coverage(&self) -> f32 {
        let total = self.width as usize * self.height as usize;
        if total == 0 {
            return 0.0;
        }
        let erased = self
            .data
            .chunks_exact(BYTES_PER_SAMPLE)
            .filter(|sample| sample[ALPHA_OFFSET] == 0)
            .count();
        100.0 * erased as f32 / total as f32
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_fresh_surface_has_zero_coverage() {
        let surface = RasterSurface::new(64, 48);
        assert_eq!(surface.coverage(), 0.0);
    }

    #[test]
    fn test_fully_erased_surface_is_one_hundred() {
        let mut surface = RasterSurface::new(32, 32);
        surface.erase_all();
        assert_eq!(surface.coverage(), 100.0);
    }

    #[test]
    fn test_erase_punches_circular_hole() {
        let mut surface = RasterSurface::new(100, 100);
        surface.erase(Vec2::new(50.0, 50.0), 10.0);

        assert_eq!(surface.alpha_at(50, 50), 0);
        assert_eq!(surface.alpha_at(50, 58), 0);
        // Corner of the bounding box is outside the circle
        assert_eq!(surface.alpha_at(42, 42), 0xFF);
        assert_eq!(surface.alpha_at(0, 0), 0xFF);
        assert!(surface.coverage() > 0.0);
        assert!(surface.coverage() < 100.0);
    }

    #[test]
    fn test_erase_clips_to_bounds() {
        let mut surface = RasterSurface::new(20, 20);
        // Stroke centered off-surface still erases the overlapping corner
        surface.erase(Vec2::new(-5.0, -5.0), 10.0);
        assert_eq!(surface.alpha_at(0, 0), 0);

        // Entirely off-surface strokes are no-ops
        let before = surface.coverage();
        surface.erase(Vec2::new(-100.0, -100.0), 10.0);
        assert_eq!(surface.coverage(), before);
    }

    #[test]
    fn test_erase_is_idempotent() {
        let mut surface = RasterSurface::new(50, 50);
        surface.erase(Vec2::new(25.0, 25.0), 8.0);
        let first = surface.coverage();
        surface.erase(Vec2::new(25.0, 25.0), 8.0);
        assert_eq!(surface.coverage(), first);
    }

    #[test]
    fn test_reset_restores_opacity() {
        let mut surface = RasterSurface::new(40, 40);
        surface.erase(Vec2::new(20.0, 20.0), 15.0);
        surface.reset();
        assert_eq!(surface.coverage(), 0.0);
    }

    #[test]
    fn test_zero_sized_surface_coverage() {
        let surface = RasterSurface::new(0, 0);
        assert_eq!(surface.coverage(), 0.0);
    }

    proptest! {
        /// Erasing never re-adds alpha: coverage is monotone non-decreasing
        /// under any erase sequence.
        #[test]
        fn prop_coverage_monotone(
            strokes in prop::collection::vec(
                (-20.0f32..120.0, -20.0f32..120.0, 1.0f32..50.0),
                1..20,
            )
        ) {
            let mut surface = RasterSurface::new(80, 80);
            let mut prev = surface.coverage();
            for (x, y, r) in strokes {
                surface.erase(Vec2::new(x, y), r);
                let now = surface.coverage();
                prop_assert!(now >= prev);
                prev = now;
            }
        }
    }
}
