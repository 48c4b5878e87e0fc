pub mod auth;
pub mod board;
pub mod commands;
pub mod config;
pub mod errors;
pub mod models;
pub mod seed;
pub mod server;
pub mod storage;
pub mod tui;
