/// Frame-time policy for the soft-body step.
/// Coefficients are tuned for `nominal_dt`; longer frames are clamped and
/// split into sub-steps so a stutter cannot blow the springs apart.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StepPolicy {
    /// Interval the coefficients are calibrated for.
    pub nominal_dt: f32,
    /// Frame deltas above this are treated as this.
    pub max_frame_dt: f32,
    /// Cap to prevent spiral of death.
    pub max_substeps: u32,
}

/// How one frame is split.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SubSteps {
    pub count: u32,
    pub dt: f32,
}

impl SubSteps {
    /// Simulated time covered by the plan.
    pub fn total(&self) -> f32 {
        self.count as f32 * self.dt
    }
}

impl StepPolicy {
    pub fn new(nominal_dt: f32) -> Self {
        Self {
            nominal_dt,
            ..Self::default()
        }
    }

    /// Split a frame delta into equal sub-steps. Non-finite or non-positive
    /// deltas yield zero sub-steps.
    pub fn plan(&self, frame_dt: f32) -> SubSteps {
        if !frame_dt.is_finite() || frame_dt <= 0.0 || self.nominal_dt <= 0.0 {
            return SubSteps { count: 0, dt: 0.0 };
        }
        let dt = frame_dt.min(self.max_frame_dt);
        if dt < frame_dt {
            log::debug!("frame dt {:.4}s clamped to {:.4}s", frame_dt, dt);
        }
        let count = ((dt / self.nominal_dt).ceil() as u32).clamp(1, self.max_substeps.max(1));
        SubSteps {
            count,
            dt: dt / count as f32,
        }
    }
}

impl Default for StepPolicy {
    fn default() -> Self {
        Self {
            nominal_dt: 1.0 / 60.0,
            max_frame_dt: 0.1,
            max_substeps: 4,
        }
    }
}
