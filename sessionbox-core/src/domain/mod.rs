//! Domain types for session boxes

pub mod bar;
pub mod range;
pub mod session;

pub use bar::{Bar, BarError};
pub use range::{BreakDirection, RangeState, SessionRange};
pub use session::SessionDefinition;
