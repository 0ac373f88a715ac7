pub mod debounce;
pub mod event_bus;
pub mod future;
pub mod ticket;

pub use debounce::*;
pub use event_bus::*;
pub use future::*;
pub use ticket::*;
