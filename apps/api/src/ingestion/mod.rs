pub mod analyzer;
pub mod extractor;
pub mod handlers;
pub mod job_requirements;
pub mod pipeline;
pub mod prompts;
pub mod schema;
pub mod scorer;
pub mod uploads;

#[cfg(test)]
pub mod testing;

pub use pipeline::{ingest_cv, Collaborators, IngestError, IngestErrorKind};
