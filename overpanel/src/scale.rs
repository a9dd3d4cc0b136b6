use serde::Deserialize;

/// Host viewport in logical pixels.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct Viewport {
    pub width: f32,
    pub height: f32,
}

impl Viewport {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }
}

/// Maps viewport dimensions to the uniform panel scale.
///
/// The panel is laid out at a fixed reference size. The scale is the largest
/// factor that keeps it inside `viewport_fraction` of both viewport axes,
/// clamped to `[min_scale, max_scale]`.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ScaleCalculator {
    pub reference_width: f32,
    pub reference_height: f32,
    pub viewport_fraction: f32,
    pub min_scale: f32,
    pub max_scale: f32,
}

impl Default for ScaleCalculator {
    fn default() -> Self {
        Self {
            reference_width: 1200.0,
            reference_height: 700.0,
            viewport_fraction: 0.95,
            min_scale: 0.6,
            max_scale: 1.2,
        }
    }
}

impl ScaleCalculator {
    /// Compute the scale for a viewport of `width` x `height`.
    pub fn compute(&self, width: f32, height: f32) -> f32 {
        let width_fit =
            width * self.viewport_fraction / self.reference_width;
        let height_fit =
            height * self.viewport_fraction / self.reference_height;
        // `f32::min` ignores a NaN operand, so a NaN axis must be caught here.
        let fit = if width.is_nan() || height.is_nan() {
            self.min_scale
        } else {
            width_fit.min(height_fit)
        };

        let scale = fit.max(self.min_scale).min(self.max_scale);
        log::trace!("viewport {width}x{height} -> scale {scale}");
        scale
    }

    pub fn compute_for(&self, viewport: Viewport) -> f32 {
        self.compute(viewport.width, viewport.height)
    }
}
