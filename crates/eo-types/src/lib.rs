pub mod config;
pub mod errors;
pub mod evaluation;

pub use config::*;
pub use errors::*;
pub use evaluation::*;
