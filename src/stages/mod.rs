pub mod persist;
pub mod retry;
pub mod sentiment;
pub mod summarize;
pub mod validate;

pub use persist::*;
pub use retry::*;
pub use sentiment::*;
pub use summarize::*;
pub use validate::*;
