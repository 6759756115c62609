mod audit;
mod eval;
mod task;

pub use audit::*;
pub use eval::*;
pub use task::*;
