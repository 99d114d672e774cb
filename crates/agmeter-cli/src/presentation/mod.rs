pub mod formatters;
pub mod views;
