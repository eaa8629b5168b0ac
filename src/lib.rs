pub mod api;
pub mod config;
pub mod db;
pub mod engine;
pub mod error;
pub mod export;
pub mod models;
pub mod roster;
pub mod session;
pub mod workers;
