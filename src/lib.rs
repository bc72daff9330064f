pub mod app;
pub mod clipboard;
pub mod config;
pub mod logging;
pub mod options;
pub mod persist;
pub mod record;
pub mod runner;
pub mod transform;
