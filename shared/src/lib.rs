//! Shopsight Shared Library
//!
//! This crate contains the domain types and logic shared across the
//! Shopsight analytics dashboard backend.
//!
//! # Modules
//!
//! - [`models`] - Record types for each stored metric family
//! - [`period`] - Reporting-period tokens and window resolution
//! - [`rollup`] - Granularity-aware bucketing and metric reduction
//! - [`storage`] - Storage traits and implementations
//!
//! # Example
//!
//! ```
//! use chrono::NaiveDate;
//! use shared::period::Period;
//!
//! let today = NaiveDate::from_ymd_opt(2024, 6, 15).unwrap();
//! let window = Period::SevenDays.window(today);
//!
//! assert_eq!(window.end, today);
//! assert_eq!(window.len_days(), 7);
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod models;
pub mod period;
pub mod rollup;
pub mod storage;

/// Re-export common dependencies for convenience.
pub use chrono;
pub use serde;
pub use serde_json;
pub use validator;
