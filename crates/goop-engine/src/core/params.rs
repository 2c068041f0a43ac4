//! Tunable physics and visual coefficients.
//!
//! One record, replaced wholesale by the host between ticks (e.g. from a
//! debug panel). Loaded from JSON; missing fields fall back to defaults.

use serde::{Deserialize, Serialize};

/// Coefficients for one lifecycle phase (falling or locked).
///
/// Stiffness, viscosity, pressure, and damping are per-tick multipliers
/// calibrated for the nominal step interval. Gravity and attraction are
/// accelerations in px/s².
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProfileParams {
    /// Fraction of last tick's velocity kept (0 = dead stop, 1 = no damping).
    pub damping: f32,
    /// Structural spring stiffness [0, 1].
    pub stiffness: f32,
    /// Fraction of the area deficit recovered per pressure pass [0, 1].
    pub pressure: f32,
    /// Fraction of home displacement erased per tick [0, 1].
    pub home_stiffness: f32,
    /// Cap on the home pull in px/s. Zero disables the cap.
    pub return_speed: f32,
    /// Slows spring convergence; higher reads as thicker goop.
    pub viscosity: f32,
    /// Downward acceleration in px/s².
    pub gravity: f32,
    /// Constraint relaxation passes per tick.
    pub iterations: u32,
    /// Same-color vertices closer than this attract (px). Zero disables.
    pub attraction_radius: f32,
    /// Separation attraction settles at (px).
    pub attraction_rest_length: f32,
    /// Attraction acceleration per px of excess separation (1/s²).
    pub attraction_stiffness: f32,
}

impl ProfileParams {
    /// Springy profile for the active piece.
    pub fn falling() -> Self {
        Self {
            damping: 0.9,
            stiffness: 0.9,
            pressure: 0.6,
            home_stiffness: 0.35,
            return_speed: 600.0,
            viscosity: 0.2,
            gravity: 300.0,
            iterations: 4,
            attraction_radius: 0.0,
            attraction_rest_length: 0.0,
            attraction_stiffness: 0.0,
        }
    }

    /// Soft, settled profile for locked goop.
    pub fn locked() -> Self {
        Self {
            damping: 0.85,
            stiffness: 0.6,
            pressure: 0.4,
            home_stiffness: 0.12,
            return_speed: 240.0,
            viscosity: 0.6,
            gravity: 0.0,
            iterations: 3,
            attraction_radius: 20.0,
            attraction_rest_length: 4.0,
            attraction_stiffness: 150.0,
        }
    }
}

impl Default for ProfileParams {
    fn default() -> Self {
        Self::locked()
    }
}

/// Purely visual knobs. Only `wall_thickness` reaches the solver (it insets
/// the tank walls so outlines do not overlap them).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VisualParams {
    /// Blur strength of the goo filter.
    pub outline_goopiness: f32,
    /// Max gap (px) bridged by a tendril between same-color blobs.
    pub tendril_radius: f32,
    /// 0 = tendrils as thick as the gap allows, 1 = hairline.
    pub tendril_skinniness: f32,
    /// Wall inset in px.
    pub wall_thickness: f32,
    /// Droplets per pop.
    pub droplet_count: u32,
    /// Initial droplet speed in px/s.
    pub droplet_speed: f32,
    /// Droplet lifetime in seconds.
    pub droplet_lifetime: f32,
    /// Droplet radius in px.
    pub droplet_size: f32,
}

impl Default for VisualParams {
    fn default() -> Self {
        Self {
            outline_goopiness: 8.0,
            tendril_radius: 14.0,
            tendril_skinniness: 0.6,
            wall_thickness: 2.0,
            droplet_count: 10,
            droplet_speed: 140.0,
            droplet_lifetime: 0.6,
            droplet_size: 4.0,
        }
    }
}

/// The full configuration record.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PhysicsParams {
    pub falling: ProfileParams,
    pub locked: ProfileParams,
    pub visual: VisualParams,
}

impl Default for PhysicsParams {
    fn default() -> Self {
        Self {
            falling: ProfileParams::falling(),
            locked: ProfileParams::locked(),
            visual: VisualParams::default(),
        }
    }
}

fn clamp_field(name: &str, value: &mut f32, lo: f32, hi: f32) {
    let clamped = if value.is_finite() { value.clamp(lo, hi) } else { lo };
    if clamped != *value {
        log::warn!("param {} = {} clamped to {}", name, value, clamped);
        *value = clamped;
    }
}

fn clamp_count(name: &str, value: &mut u32, lo: u32, hi: u32) {
    let clamped = (*value).clamp(lo, hi);
    if clamped != *value {
        log::warn!("param {} = {} clamped to {}", name, value, clamped);
        *value = clamped;
    }
}

impl ProfileParams {
    fn sanitize(&mut self, profile: &str) {
        let f = |field: &str| format!("{}.{}", profile, field);
        clamp_field(&f("damping"), &mut self.damping, 0.0, 1.0);
        clamp_field(&f("stiffness"), &mut self.stiffness, 0.0, 1.0);
        clamp_field(&f("pressure"), &mut self.pressure, 0.0, 1.0);
        clamp_field(&f("home_stiffness"), &mut self.home_stiffness, 0.0, 1.0);
        clamp_field(&f("return_speed"), &mut self.return_speed, 0.0, 1.0e5);
        clamp_field(&f("viscosity"), &mut self.viscosity, 0.0, 100.0);
        clamp_field(&f("gravity"), &mut self.gravity, -1.0e4, 1.0e4);
        clamp_count(&f("iterations"), &mut self.iterations, 1, 32);
        clamp_field(&f("attraction_radius"), &mut self.attraction_radius, 0.0, 500.0);
        clamp_field(&f("attraction_rest_length"), &mut self.attraction_rest_length, 0.0, 500.0);
        clamp_field(&f("attraction_stiffness"), &mut self.attraction_stiffness, 0.0, 1.0e4);
    }
}

impl PhysicsParams {
    /// Parse params from JSON. Absent fields keep their defaults.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Copy with every field clamped to a range the solver stays stable in.
    /// Non-finite values collapse to the range minimum.
    pub fn sanitized(mut self) -> Self {
        self.falling.sanitize("falling");
        self.locked.sanitize("locked");
        let v = &mut self.visual;
        clamp_field("visual.outline_goopiness", &mut v.outline_goopiness, 0.0, 50.0);
        clamp_field("visual.tendril_radius", &mut v.tendril_radius, 0.0, 200.0);
        clamp_field("visual.tendril_skinniness", &mut v.tendril_skinniness, 0.0, 1.0);
        clamp_field("visual.wall_thickness", &mut v.wall_thickness, 0.0, 50.0);
        clamp_count("visual.droplet_count", &mut v.droplet_count, 0, 256);
        clamp_field("visual.droplet_speed", &mut v.droplet_speed, 0.0, 5000.0);
        clamp_field("visual.droplet_lifetime", &mut v.droplet_lifetime, 0.0, 10.0);
        clamp_field("visual.droplet_size", &mut v.droplet_size, 0.0, 100.0);
        self
    }

    /// Profile for a blob in the given phase.
    pub fn profile(&self, falling: bool) -> &ProfileParams {
        if falling {
            &self.falling
        } else {
            &self.locked
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn profiles_differ() {
        let p = PhysicsParams::default();
        assert!(p.falling.gravity > p.locked.gravity);
        assert!(p.falling.home_stiffness > p.locked.home_stiffness);
        assert_eq!(p.profile(true), &p.falling);
        assert_eq!(p.profile(false), &p.locked);
    }

    #[test]
    fn partial_json_fills_defaults() {
        let json = r#"{
            "falling": { "gravity": 120.0, "iterations": 6 },
            "visual": { "droplet_count": 3 }
        }"#;
        let p = PhysicsParams::from_json(json).unwrap();
        assert_eq!(p.falling.gravity, 120.0);
        assert_eq!(p.falling.iterations, 6);
        // Unspecified profile fields fall back to the locked defaults.
        assert_eq!(p.falling.damping, ProfileParams::default().damping);
        assert_eq!(p.locked, ProfileParams::locked());
        assert_eq!(p.visual.droplet_count, 3);
        assert_eq!(p.visual.wall_thickness, VisualParams::default().wall_thickness);
    }

    #[test]
    fn json_roundtrip_preserves_values() {
        let mut p = PhysicsParams::default();
        p.locked.viscosity = 1.25;
        let back = PhysicsParams::from_json(&p.to_json().unwrap()).unwrap();
        assert_eq!(back, p);
    }

    #[test]
    fn malformed_json_is_an_error() {
        assert!(PhysicsParams::from_json("{ not json").is_err());
    }

    #[test]
    fn sanitized_clamps_out_of_range() {
        let mut p = PhysicsParams::default();
        p.falling.damping = 3.0;
        p.falling.iterations = 0;
        p.locked.stiffness = f32::NAN;
        p.visual.tendril_skinniness = -1.0;
        let s = p.sanitized();
        assert_eq!(s.falling.damping, 1.0);
        assert_eq!(s.falling.iterations, 1);
        assert_eq!(s.locked.stiffness, 0.0);
        assert_eq!(s.visual.tendril_skinniness, 0.0);
        // In-range fields are untouched.
        assert_eq!(s.falling.gravity, p.falling.gravity);
    }
}
