pub mod blob;
pub mod falling;
pub mod grid;
pub mod params;
pub mod physics;
pub mod scene;
pub mod solver;
pub mod time;
pub mod topology;
pub mod vector;
