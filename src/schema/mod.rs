pub mod mapper;
pub mod types;

pub use mapper::*;
pub use types::*;
