//! Attach Go source file locations to JUnit XML test reports.
//!
//! The pipeline is:
//!
//! 1. [`source_index::build_index`] walks a repository and maps every
//!    `Test*`/`Benchmark*`/`Example*`/`Fuzz*` function to its `_test.go` file.
//! 2. [`junit::read_report`] decodes the runner's report.
//! 3. [`enhance::enhance`] drops synthetic entries and fills in `file`
//!    attributes through the tiered [`resolver::Resolver`].
//! 4. [`junit::write_report`] writes the result back out.

#![forbid(unsafe_code)]

pub mod config;
pub mod enhance;
pub mod error;
pub mod go_source;
pub mod junit;
pub mod logging;
pub mod quarantine;
pub mod resolver;
pub mod source_index;
pub mod walker;

pub use config::{EnhanceConfig, MatchPolicy};
pub use enhance::{EnhanceSummary, MatchResult, enhance};
pub use error::{Error, Result};
pub use resolver::{MatchTier, Resolution, Resolver, resolve};
pub use source_index::{SourceIndex, build_index};
