//! The host's description of its types: what members exist, what they declare and which
//! markers are attached to them.

mod markers;
mod member;
mod types;

pub use markers::*;
pub use member::*;
pub use types::*;
