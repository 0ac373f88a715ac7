pub mod adapter;
pub mod expr;
pub mod layer;
pub mod memory;
pub mod surface;

pub use adapter::*;
pub use expr::*;
pub use layer::*;
pub use memory::*;
pub use surface::*;
