//! Pop droplets: small round splashes thrown off a blob as it is cleared.

use glam::Vec2;

use crate::api::types::GoopColor;

/// A single droplet with ballistic motion and a fading lifetime.
#[derive(Debug, Clone, PartialEq)]
pub struct Droplet {
    pub position: Vec2,
    /// px/s
    pub velocity: Vec2,
    pub radius: f32,
    pub color: GoopColor,
    /// Seconds left to live.
    pub lifetime: f32,
    /// Lifetime at spawn, for fading.
    pub max_lifetime: f32,
}

impl Droplet {
    /// Velocity retained per second.
    pub const DRAG_PER_SECOND: f32 = 0.35;

    pub fn new(position: Vec2, velocity: Vec2, radius: f32, color: GoopColor, lifetime: f32) -> Self {
        Droplet {
            position,
            velocity,
            radius,
            color,
            lifetime,
            max_lifetime: lifetime,
        }
    }

    /// Advance one frame. Returns false when expired.
    pub fn tick(&mut self, dt: f32, gravity: f32) -> bool {
        self.lifetime -= dt;
        if self.lifetime <= 0.0 {
            return false;
        }
        self.velocity.y += gravity * dt;
        self.velocity *= Self::DRAG_PER_SECOND.powf(dt);
        self.position += self.velocity * dt;
        true
    }

    /// 1 at spawn, 0 at expiry.
    pub fn alpha(&self) -> f32 {
        if self.max_lifetime <= 0.0 {
            return 0.0;
        }
        (self.lifetime / self.max_lifetime).clamp(0.0, 1.0)
    }

    /// Radius shrinks with the fade.
    pub fn current_radius(&self) -> f32 {
        self.radius * (0.5 + 0.5 * self.alpha())
    }
}
