pub mod analysis;
pub mod outcome;
pub mod transcript;

pub use analysis::*;
pub use outcome::*;
pub use transcript::*;
