//! Historical grading of completed dispatches.

pub mod domain;
pub mod parser;
pub mod summary;

pub use domain::{CompletedDispatch, GradedDispatch};
pub use parser::{HistoryImport, HistoryImportError, HistoryImporter};
pub use summary::{grade_history, GradeSummary};
