pub mod geometry;
pub mod session;

pub use geometry::*;
pub use session::*;
