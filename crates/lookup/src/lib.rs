//! External lookups: debounced address search and one-shot device location.

pub mod geolocation;
pub mod protocol;
pub mod provider;
pub mod search;

pub use geolocation::*;
pub use protocol::*;
pub use provider::*;
pub use search::*;
