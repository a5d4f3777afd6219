pub mod board;
pub mod ids;
pub mod list;
pub mod task;

pub use board::*;
pub use ids::*;
pub use list::*;
pub use task::*;
