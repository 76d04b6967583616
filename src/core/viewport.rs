use glam::Vec2;
use serde::Deserialize;

/// How the raster is fitted into the window
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum ScalingPolicy {
    /// Largest rectangle with the raster's exact aspect ratio, fractional scale
    #[default]
    AspectFit,
    /// Largest whole-number scale that fits, never below 1x
    IntegerFit,
}

/// Destination rectangle in window pixel coordinates
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

/// Sub-rectangle of the source image in normalized texture coordinates
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UvRect {
    pub offset: [f32; 2],
    pub scale: [f32; 2],
}

impl UvRect {
    /// The whole source image
    pub const FULL: Self = Self {
        offset: [0.0, 0.0],
        scale: [1.0, 1.0],
    };
}

impl Viewport {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self { x, y, width, height }
    }

    /// Whether the rectangle lies entirely inside a `window_w`×`window_h` window
    pub fn is_within(&self, window_w: u32, window_h: u32) -> bool {
        const EPS: f32 = 1e-3;
        self.x >= -EPS
            && self.y >= -EPS
            && self.x + self.width <= window_w as f32 + EPS
            && self.y + self.height <= window_h as f32 + EPS
    }

    /// Clip to the window bounds.
    ///
    /// Device viewports must stay inside the render target, so an overflowing
    /// `IntegerFit` rectangle is cut down here and the returned [`UvRect`]
    /// selects the matching part of the source image. Returns `None` when
    /// nothing is visible.
    pub fn clip_to_window(&self, window_w: u32, window_h: u32) -> Option<(Viewport, UvRect)> {
        let origin = Vec2::new(self.x, self.y);
        let size = Vec2::new(self.width, self.height);
        let bounds = Vec2::new(window_w.max(1) as f32, window_h.max(1) as f32);

        let min = origin.max(Vec2::ZERO);
        let max = (origin + size).min(bounds);
        let visible = max - min;
        if visible.x <= 0.0 || visible.y <= 0.0 {
            return None;
        }

        let uv_offset = (min - origin) / size;
        let uv_scale = visible / size;

        Some((
            Viewport::new(min.x, min.y, visible.x, visible.y),
            UvRect {
                offset: uv_offset.to_array(),
                scale: uv_scale.to_array(),
            },
        ))
    }
}

/// Largest integer `k >= 1` with `k * raster <= window` on both axes
pub fn integer_scale(window_w: u32, window_h: u32, raster_w: u32, raster_h: u32) -> u32 {
    let scale_w = window_w / raster_w.max(1);
    let scale_h = window_h / raster_h.max(1);
    scale_w.min(scale_h).max(1)
}

/// Compute where the raster lands inside the window.
///
/// Window sizes below 1 are treated as 1 so a minimized window never divides
/// by zero.
pub fn compute_viewport(
    window_w: u32,
    window_h: u32,
    raster_w: u32,
    raster_h: u32,
    policy: ScalingPolicy,
) -> Viewport {
    let window_w = window_w.max(1);
    let window_h = window_h.max(1);
    let raster_w = raster_w.max(1);
    let raster_h = raster_h.max(1);

    match policy {
        ScalingPolicy::AspectFit => {
            let cw = window_w as f32;
            let ch = window_h as f32;
            let canvas_aspect = cw / ch;
            let emu_aspect = raster_w as f32 / raster_h as f32;

            if emu_aspect < canvas_aspect {
                let width = ch * emu_aspect;
                Viewport::new((cw - width) / 2.0, 0.0, width, ch)
            } else {
                let height = cw / emu_aspect;
                Viewport::new(0.0, (ch - height) / 2.0, cw, height)
            }
        }
        ScalingPolicy::IntegerFit => {
            let scale = integer_scale(window_w, window_h, raster_w, raster_h);
            let dest_w = i64::from(scale * raster_w);
            let dest_h = i64::from(scale * raster_h);
            // Truncating division: odd remainders lose the half pixel
            let x = (i64::from(window_w) - dest_w) / 2;
            let y = (i64::from(window_h) - dest_h) / 2;
            Viewport::new(x as f32, y as f32, dest_w as f32, dest_h as f32)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_integer_fit_exact_double() {
        let vp = compute_viewport(640, 480, 320, 240, ScalingPolicy::IntegerFit);
        assert_eq!(vp, Viewport::new(0.0, 0.0, 640.0, 480.0));
    }

    #[test]
    fn test_aspect_fit_pillarbox() {
        let vp = compute_viewport(1000, 500, 320, 240, ScalingPolicy::AspectFit);
        assert_eq!(vp.y, 0.0);
        assert_eq!(vp.height, 500.0);
        assert!((vp.width - 666.6667).abs() < 0.01);
        assert!((vp.x - 166.6667).abs() < 0.01);
    }

    #[test]
    fn test_aspect_fit_letterbox() {
        let vp = compute_viewport(640, 1000, 320, 240, ScalingPolicy::AspectFit);
        assert_eq!(vp.x, 0.0);
        assert_eq!(vp.width, 640.0);
        assert!((vp.height - 480.0).abs() < 0.01);
        assert!((vp.y - 260.0).abs() < 0.01);
    }

    #[test]
    fn test_integer_fit_clamps_to_one() {
        let vp = compute_viewport(100, 100, 320, 240, ScalingPolicy::IntegerFit);
        assert_eq!(vp, Viewport::new(-110.0, -70.0, 320.0, 240.0));
    }

    #[test]
    fn test_integer_fit_odd_remainder_truncates() {
        // 701 - 640 = 61, half is 30.5
        let vp = compute_viewport(701, 480, 320, 240, ScalingPolicy::IntegerFit);
        assert_eq!(vp.x, 30.0);
        assert_eq!(vp.y, 0.0);
    }

    #[test]
    fn test_zero_window_is_clamped() {
        let vp = compute_viewport(0, 0, 320, 240, ScalingPolicy::AspectFit);
        assert!(vp.width > 0.0 && vp.height > 0.0);
        assert!(vp.x.is_finite() && vp.y.is_finite());

        let vp = compute_viewport(0, 0, 320, 240, ScalingPolicy::IntegerFit);
        assert_eq!(vp.width, 320.0);
        assert_eq!(vp.height, 240.0);
    }

    #[test]
    fn test_integer_scale() {
        assert_eq!(integer_scale(1920, 1080, 320, 240), 4);
        assert_eq!(integer_scale(1280, 200, 320, 240), 1);
        assert_eq!(integer_scale(959, 720, 320, 240), 2);
    }

    #[test]
    fn test_clip_inside_is_identity() {
        let vp = Viewport::new(10.0, 20.0, 100.0, 50.0);
        let (clipped, uv) = vp.clip_to_window(200, 200).unwrap();
        assert_eq!(clipped, vp);
        assert_eq!(uv, UvRect::FULL);
    }

    #[test]
    fn test_clip_overflowing_selects_center() {
        let vp = compute_viewport(100, 100, 320, 240, ScalingPolicy::IntegerFit);
        let (clipped, uv) = vp.clip_to_window(100, 100).unwrap();
        assert_eq!(clipped, Viewport::new(0.0, 0.0, 100.0, 100.0));
        assert!((uv.offset[0] - 110.0 / 320.0).abs() < 1e-6);
        assert!((uv.offset[1] - 70.0 / 240.0).abs() < 1e-6);
        assert!((uv.scale[0] - 100.0 / 320.0).abs() < 1e-6);
        assert!((uv.scale[1] - 100.0 / 240.0).abs() < 1e-6);
    }

    #[test]
    fn test_clip_fully_outside() {
        let vp = Viewport::new(300.0, 0.0, 50.0, 50.0);
        assert!(vp.clip_to_window(200, 200).is_none());
    }

    #[test]
    fn test_is_within() {
        assert!(Viewport::new(0.0, 0.0, 640.0, 480.0).is_within(640, 480));
        assert!(!Viewport::new(-110.0, -70.0, 320.0, 240.0).is_within(100, 100));
    }
}
