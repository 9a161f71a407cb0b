//! The closed set of imagery operations and the contract for running them.

mod definition;
mod engine;
mod mock;
mod sink;

pub use definition::*;
pub use engine::ImageryEngine;
pub use mock::MockEngine;
pub use sink::OutputSink;
