// src/services/mod.rs
pub mod amortization;
pub mod analysis;
pub mod analysis_store;
pub mod calculations;
pub mod document;
pub mod error_log;
pub mod format;
pub mod ignore_list;
pub mod interest_rate;
pub mod listing;
pub mod property_source;
pub mod url_store;
