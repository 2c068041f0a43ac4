pub mod api;
pub mod core;
pub mod error;
pub mod systems;

// Re-export key types at crate root for convenience
pub use api::engine::{EngineConfig, GoopEngine};
pub use api::types::{ActivePieceState, BlobId, Bounds, GoopColor, GridCell, StepContext};
pub use core::blob::{BlobPhase, SoftBlob, Spring, SpringKind, Vertex};
pub use core::falling::FallingPiece;
pub use core::grid::GridOccupancy;
pub use core::params::{PhysicsParams, ProfileParams, VisualParams};
pub use core::physics::{apply_attraction, step_physics};
pub use core::scene::BlobScene;
pub use core::time::{StepPolicy, SubSteps};
pub use core::topology::{build_topology, BlobTopology};
pub use error::GoopError;
pub use systems::effects::{Droplet, DropletState};
pub use systems::filter::GooFilter;
pub use systems::path::{smooth_path, BlobRenderData};
pub use systems::tendrils::{find_tendrils, Tendril};

#[cfg(feature = "vectors")]
pub use systems::vector::{GooMesh, GooVertex};
