pub mod crypt;
pub mod report;

pub use crypt::*;
pub use report::*;
