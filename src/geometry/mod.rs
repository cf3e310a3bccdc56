pub mod halfspaces;
pub mod polytope;
pub mod signal_vectors;
pub mod vertex_enum;

pub use halfspaces::*;
pub use polytope::*;
pub use signal_vectors::*;
