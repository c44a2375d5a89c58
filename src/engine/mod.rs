pub mod cipher;
pub mod keystream;
pub mod schedule;
pub mod state;

pub use cipher::*;
pub use keystream::*;
pub use schedule::*;
pub use state::*;
