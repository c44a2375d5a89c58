pub mod analysis;
pub mod source;
pub mod tester;

pub use analysis::*;
pub use source::*;
pub use tester::*;
