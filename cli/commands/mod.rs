pub mod completion;
pub mod config;
pub mod debug;
pub mod folders;
pub mod generate;
