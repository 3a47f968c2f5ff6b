mod attendance;
mod declaration;
mod learner;
mod schedule;
mod signature;

pub mod toml_input;

pub use attendance::*;
pub use declaration::*;
pub use learner::*;
pub use schedule::*;
pub use signature::*;
