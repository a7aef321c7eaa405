pub mod app;
pub mod backend;
pub mod cmd;
pub mod compute;
pub mod config;
pub mod error;
pub mod logging;
pub mod namer;
pub mod status;
pub mod urlmap;
