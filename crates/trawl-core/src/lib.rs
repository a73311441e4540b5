//! # Trawl Core Library
//!
//! This crate provides indexing, ignore-file evaluation and ranked fuzzy
//! search over configured directory trees for the Trawl file finder.
//!
//! ## Architecture
//!
//! - **Types** (`types`): Indexed entries, scan roots and search results
//! - **Matcher** (`matcher`): Layered gitignore-style include/exclude rules
//! - **Scan** (`scan`): Depth-bounded directory walk
//! - **Score** (`score`): Query matching tiers and depth bonus
//! - **Cache** (`cache`): FIFO-with-TTL memo of recent searches
//! - **Index** (`index`): Entry set with `scan` and `search`
//! - **Config** (`config`): Typed settings with per-field fallbacks
//! - **Service** (`service`): Long-lived service with periodic rescans
//!
//! ## Example
//!
//! ```rust,no_run
//! use trawl_core::FileService;
//!
//! let service = FileService::new();
//! service.set_directories("~/Documents=3\n~/Downloads");
//!
//! for result in service.search("invoice") {
//!     println!("{}", result);
//! }
//! ```

pub mod cache;
pub mod config;
pub mod error;
pub mod index;
pub mod matcher;
pub mod scan;
pub mod score;
pub mod service;
pub mod types;

// Re-export commonly used types
pub use cache::ResultCache;
pub use config::Settings;
pub use error::{Result, TrawlError};
pub use index::{Index, IndexSettings};
pub use matcher::{IgnoreMatcher, IgnoreRules};
pub use scan::{LoggingProgress, ScanProgress};
pub use score::Query;
pub use service::FileService;
pub use types::{PathEntry, ScanRoot, ScanStats, ScoredResult};
