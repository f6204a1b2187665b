//! Domain records stored by the repositories and returned by the API.

pub mod booking;
pub mod event;
pub mod macros;

pub use booking::*;
pub use event::*;
