pub mod config;
pub mod definition;
pub mod generate;
