pub mod app;
pub mod config;
pub mod host;
pub mod pipeline;
pub mod process;
pub mod runtime;
pub mod shared;
pub mod steps;
