pub mod client;
pub mod config;
pub mod db;
pub mod errors;
pub mod generation;
pub mod handlers;
pub mod models;
pub mod providers;
pub mod sse;
pub mod store;
