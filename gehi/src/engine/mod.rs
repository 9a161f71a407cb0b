mod command_engine;

pub use command_engine::CommandEngine;
