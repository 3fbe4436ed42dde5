pub mod location;
pub mod rule;
pub mod weather;

pub use location::*;
pub use rule::*;
pub use weather::*;
