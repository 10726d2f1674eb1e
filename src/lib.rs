//! # Roster Tracker
//!
//! A local League of Legends pro player stats tracker with Leaguepedia import.
//!
//! ## Architecture
//!
//! - **models**: Core data structures (players, inputs, roster summary)
//! - **calculate**: Derived metrics and roster-wide aggregation
//! - **view**: In-memory sort/filter engine and display helpers
//! - **storage**: Player repository (SQLite, in-memory)
//! - **sync**: Leaguepedia Cargo API client and bulk import
//! - **api**: REST API endpoints
//! - **config**: Configuration loading and validation

pub mod api;
pub mod calculate;
pub mod config;
pub mod models;
pub mod storage;
pub mod sync;
pub mod view;

pub use models::*;
