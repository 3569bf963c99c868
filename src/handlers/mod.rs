// src/handlers/mod.rs
pub mod input;
pub mod report;
pub mod wizard;
