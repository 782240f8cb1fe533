#![doc = include_str!("../README.md")]
#![forbid(unsafe_code)]

#[macro_use]
mod macros;

mod buffer_pool;
mod caller;
mod config;
mod dispatcher;
mod format;
mod stack;
mod writer;

pub use buffer_pool::*;
pub use caller::*;
pub use config::*;
pub use dispatcher::*;
pub use format::*;
pub use macros::__private;
pub use stack::*;
pub use writer::*;
