pub mod config;
pub mod error;
pub mod occupancy;
pub mod output;
pub mod services;
pub mod window;
