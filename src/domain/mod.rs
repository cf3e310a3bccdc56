pub mod operation_point;
pub mod series;
pub mod types;

pub use operation_point::*;
pub use series::*;
pub use types::*;
