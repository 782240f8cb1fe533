#![doc = include_str!("../README.md")]
#![forbid(unsafe_code)]

mod memory_sink;
mod test_logger;

pub use memory_sink::*;
pub use random_test::*;
pub use test_logger::*;
