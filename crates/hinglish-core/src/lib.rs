//! Hinglish Core
//!
//! Types shared by the Hinglish moderation classifier crates:
//! - Classification result records (`Verdict`) with method tags
//! - The analysis report returned by the HTTP API
//! - Error types and result handling

pub mod error;
pub mod types;

pub use error::{Error, Result};
pub use types::{
    AnalysisReport, Method, Task, ToxicityVerdict, Verdict, CATEGORY_LABELS, SENTIMENT_LABELS,
};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::error::{Error, Result};
    pub use crate::types::{AnalysisReport, Method, Task, ToxicityVerdict, Verdict};
}
