pub mod features;
pub mod snapshot;
pub mod weather;

pub use features::*;
pub use snapshot::*;
pub use weather::*;
