pub mod effects;
pub mod filter;
pub mod path;
pub mod tendrils;
#[cfg(feature = "vectors")]
pub mod vector;
