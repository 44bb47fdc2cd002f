// src/bbmp/mod.rs
pub mod client;
pub mod models;
