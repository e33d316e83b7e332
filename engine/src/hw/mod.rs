pub mod config;
pub mod jack;
pub mod ports;
pub mod traits;
