#[macro_use]
pub mod logger;
pub mod cmd;
pub mod configuration;
