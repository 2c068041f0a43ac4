//! Pop effect: droplets thrown off popped blobs.
//!
//! The engine never requires this; the host calls `GoopEngine::pop` when it
//! wants a splash and reads the droplets back for drawing.

mod droplet;
mod rng;

pub use droplet::Droplet;
pub use rng::Rng;

use glam::Vec2;

use crate::core::blob::SoftBlob;
use crate::core::params::VisualParams;
use crate::core::vector;

/// Live droplets plus the generator that scatters them.
pub struct DropletState {
    pub droplets: Vec<Droplet>,
    pub rng: Rng,
}

impl DropletState {
    pub fn new(seed: u64) -> Self {
        DropletState {
            droplets: Vec::with_capacity(64),
            rng: Rng::new(seed.wrapping_add(7919)),
        }
    }

    /// Throw `droplet_count` droplets outward from random vertices of `blob`.
    pub fn burst(&mut self, blob: &SoftBlob, visual: &VisualParams) {
        if blob.vertices.is_empty() || visual.droplet_lifetime <= 0.0 {
            return;
        }
        let n = blob.vertices.len() as u32;
        for _ in 0..visual.droplet_count {
            let v = &blob.vertices[self.rng.next_int(n) as usize];
            let mut dir = vector::normalize(v.pos - blob.centroid);
            if dir == Vec2::ZERO {
                dir = Vec2::NEG_Y;
            }
            let spread = self.rng.range(-0.4, 0.4);
            let dir = vector::rotate_point(dir, Vec2::ZERO, spread);
            let speed = visual.droplet_speed * self.rng.range(0.6, 1.0);
            self.droplets.push(Droplet::new(
                v.pos,
                dir * speed,
                visual.droplet_size,
                blob.color,
                visual.droplet_lifetime,
            ));
        }
    }

    /// Advance all droplets and drop expired ones.
    pub fn tick(&mut self, dt: f32, gravity: f32) {
        self.droplets.retain_mut(|d| d.tick(dt, gravity));
    }

    pub fn len(&self) -> usize {
        self.droplets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.droplets.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::types::{BlobId, GoopColor, GridCell};
    use crate::core::topology::build_topology;

    fn popped() -> SoftBlob {
        let cells = [GridCell::new(3, 3), GridCell::new(4, 3)];
        SoftBlob::new(
            BlobId::locked("p"),
            GoopColor(0xffaa00),
            build_topology(&cells, 30.0, Vec2::ZERO),
            false,
        )
    }

    #[test]
    fn burst_spawns_configured_count() {
        let mut fx = DropletState::new(42);
        let visual = VisualParams::default();
        fx.burst(&popped(), &visual);
        assert_eq!(fx.len(), visual.droplet_count as usize);
        for d in &fx.droplets {
            assert_eq!(d.color, GoopColor(0xffaa00));
            assert_eq!(d.radius, visual.droplet_size);
            let speed = d.velocity.length();
            assert!(speed >= visual.droplet_speed * 0.6 - 1e-3);
            assert!(speed <= visual.droplet_speed + 1e-3);
        }
    }

    #[test]
    fn droplets_move_away_from_centroid() {
        let blob = popped();
        let mut fx = DropletState::new(1);
        fx.burst(&blob, &VisualParams::default());
        for d in &fx.droplets {
            let outward = d.position - blob.centroid;
            assert!(outward.dot(d.velocity) > 0.0);
        }
    }

    #[test]
    fn same_seed_same_burst() {
        let blob = popped();
        let mut a = DropletState::new(9);
        let mut b = DropletState::new(9);
        a.burst(&blob, &VisualParams::default());
        b.burst(&blob, &VisualParams::default());
        assert_eq!(a.droplets, b.droplets);
    }

    #[test]
    fn tick_culls_expired() {
        let mut fx = DropletState::new(42);
        let visual = VisualParams::default();
        fx.burst(&popped(), &visual);
        fx.tick(visual.droplet_lifetime * 0.5, 400.0);
        assert_eq!(fx.len(), visual.droplet_count as usize);
        fx.tick(visual.droplet_lifetime, 400.0);
        assert!(fx.is_empty());
    }
}
