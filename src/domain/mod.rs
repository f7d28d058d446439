pub mod error;
pub mod features;
pub mod holiday;
pub mod types;

pub use error::*;
pub use features::*;
pub use holiday::*;
pub use types::*;
