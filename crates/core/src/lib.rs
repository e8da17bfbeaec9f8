//! Domain types and pure logic for the VitaFit prediction service.
//!
//! Nothing in this crate performs I/O: request/record types, the unit
//! normalizer, the activity-level rule table, and the dish catalog live here
//! so the pipeline, storage, and HTTP layers share one vocabulary.

pub mod activity;
pub mod dish_catalog;
pub mod error;
pub mod input;
pub mod plan;
pub mod session;
pub mod types;
pub mod units;
