mod account_repository;
mod client;
mod config;
mod device_registrar;

pub use account_repository::*;
pub use client::*;
pub use config::*;
pub use device_registrar::*;
