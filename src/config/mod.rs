pub mod derive;
pub mod types;
pub mod validator;

pub use derive::*;
pub use types::*;
pub use validator::*;
