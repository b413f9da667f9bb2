pub mod backend;
pub mod config;
pub mod context;
pub mod display;
pub mod error;
pub mod fallback;
pub mod health;
pub mod logging;
pub mod monitor;
pub mod predict;
pub mod reading;
pub mod render;
pub mod sim;
