//! Business-logic services used by the HTTP handlers.

pub mod asset_numbers;
pub mod assets;
pub mod departments;
pub mod reports;
pub mod requests;
pub mod stock_takes;
