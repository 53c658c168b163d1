//! Production-line operator allocation.
//!
//! Assigns operators to the operations of a production line from a skill
//! matrix, then derives expected output, performance ratings and line
//! balance figures.
//!
//! # Modules
//!
//! - **`models`**: Domain types: `Table`, `Operator`, `SkillTable`,
//!   `Operation`, `TaskList`, `Assignment`, `Allocation`
//! - **`validation`**: Input schema checks (required columns)
//! - **`normalize`**: Label canonicalization and lenient number parsing
//! - **`resolver`**: Fuzzy operation label → skill column resolution
//! - **`grouping`**: Automatic and manual operation combination, rule log
//! - **`allocation`**: Greedy most-proficient-first operator matching
//! - **`rating`**: Expected output and 1-5 performance tiers
//! - **`summary`**: Operator, machine-type and line-balance roll-ups
//! - **`report`**: End-to-end pipeline and CSV export
//! - **`config`**, **`error`**, **`logging`**: Run configuration, error types, tracing setup
//!
//! # Architecture
//!
//! The crate is a synchronous, deterministic in-memory pass. Spreadsheet
//! ingestion and presentation live outside it: input arrives as parsed
//! [`models::Table`]s and results leave as a serializable
//! [`report::AllocationReport`].
//!
//! # References
//!
//! - Ratcliff & Obershelp (1988), "Pattern Matching: The Gestalt Approach"
//! - Scholl (1999), "Balancing and Sequencing of Assembly Lines"

pub mod allocation;
pub mod config;
pub mod error;
pub mod grouping;
pub mod logging;
pub mod models;
pub mod normalize;
pub mod rating;
pub mod report;
pub mod resolver;
pub mod summary;
pub mod validation;
