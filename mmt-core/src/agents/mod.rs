pub mod corporate;
pub mod foreign;
pub mod household;

pub use corporate::*;
pub use foreign::*;
pub use household::*;
