//! Core trait abstractions: the extractor capability, the persistence seam,
//! and the progress publication seam.

pub mod extractor;
pub mod progress;
pub mod store;

pub use extractor::{Extractor, Stage};
pub use progress::{NullSink, ProgressSink, ProgressStatus, ProgressUpdate};
pub use store::{AnalysisStore, SearchHit};
