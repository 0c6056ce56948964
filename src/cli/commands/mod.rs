//! CLI command implementations.

mod doctor;
mod full_pipeline;
mod summarize;
mod transcribe;

pub use doctor::run_doctor;
pub use full_pipeline::run_full_pipeline;
pub use summarize::run_summarize;
pub use transcribe::run_transcribe;
