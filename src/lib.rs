//! Recursive directory statistics: traversal and aggregation engine,
//! terminal renderer, JSON/CSV exporters, and an HTTP API.

pub mod config;
pub mod core;
pub mod export;
pub mod models;
pub mod render;
pub mod web;
