pub mod api;
pub mod config;
pub mod db;
pub mod mirror;
pub mod models;
pub mod remote;
pub mod render;
pub mod store;
