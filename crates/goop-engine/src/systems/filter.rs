use crate::core::params::VisualParams;

/// Gaussian blur followed by an alpha contrast boost. Overlapping blurred
/// blobs cross the alpha threshold together and read as one mass of goo.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GooFilter {
    pub blur_std_dev: f32,
    /// Alpha row of the color matrix: `a' = a * multiplier + offset`.
    pub alpha_multiplier: f32,
    pub alpha_offset: f32,
}

impl GooFilter {
    pub fn from_visual(visual: &VisualParams) -> Self {
        let g = visual.outline_goopiness.max(0.0);
        Self {
            blur_std_dev: g,
            alpha_multiplier: 1.0 + 1.7 * g,
            alpha_offset: -0.7 * g,
        }
    }

    /// A goopiness of zero disables the effect.
    pub fn is_identity(&self) -> bool {
        self.blur_std_dev == 0.0
    }

    /// SVG `feColorMatrix` values for the filter.
    pub fn color_matrix(&self) -> String {
        format!(
            "1 0 0 0 0  0 1 0 0 0  0 0 1 0 0  0 0 0 {:.3} {:.3}",
            self.alpha_multiplier, self.alpha_offset
        )
    }
}
