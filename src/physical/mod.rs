pub mod electric_vehicle;
pub mod resource;
pub mod storage;

pub use electric_vehicle::*;
pub use resource::*;
pub use storage::*;
