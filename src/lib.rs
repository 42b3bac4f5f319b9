//! Genotyping call viewer.
//!
//! This crate interprets cohort call tables (long or wide layout) into per
//! category counts, and associates per-SNP cluster diagnostic images
//! (`<snp>_k<1|2|3>.png`) with markers for display.
//!
//! The binary `callview` prints summaries and registries as JSON and, with
//! the `egui` feature, opens the interactive viewer.

pub mod batch;
pub mod config;
pub mod labels;
pub mod model;
pub mod registry;
pub mod selection;
pub mod state;
pub mod summary;
pub mod table;

// Optional GUI/egui functionality lives behind the `egui` feature flag.
#[cfg(feature = "egui")]
pub mod egui_app;
