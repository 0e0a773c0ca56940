pub mod booking;
pub mod cart;
pub mod config;
pub mod i18n;
pub mod text;
pub mod translation;
