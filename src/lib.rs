//! District electricity demand prediction server.
//!
//! Startup loads one short-range weather forecast snapshot and up to two
//! externally trained models; requests are then answered from that
//! immutable state, falling back to a heuristic when a model is missing.

pub mod api;
pub mod config;
pub mod domain;
pub mod forecast;
pub mod ml;
pub mod service;
pub mod telemetry;
