//! Orchestration of filter, selection, search and location state over a
//! render surface.

pub mod config;
pub mod driver;
pub mod events;
pub mod session;

pub use config::*;
pub use driver::*;
pub use events::*;
pub use session::*;
