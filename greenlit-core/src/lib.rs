// src/lib.rs

pub mod config;
pub mod db;
pub mod platforms;
pub mod repositories;
pub mod services;
pub mod stores;
pub mod tasks;
pub mod test_utils;
pub mod utils;
pub mod web;

pub use db::Database;
pub use greenlit_common::error::Error;
pub use greenlit_common::LicenseError;
