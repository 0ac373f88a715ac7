pub mod counts;
pub mod entity;
pub mod filter;
pub mod query;
pub mod selection;
pub mod store;

pub use counts::*;
pub use entity::*;
pub use filter::*;
pub use query::*;
pub use selection::*;
pub use store::*;
