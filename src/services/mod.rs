pub mod browser;
pub mod droid;
pub mod extraction_backend;
pub mod extraction_orchestrator;
pub mod html_text;
pub mod llm_extractor;
pub mod pipeline;
pub mod reporter;
pub mod run_gate;
pub mod session_fetcher;
pub mod transient_document;

#[cfg(test)]
pub(crate) mod testing;

pub use browser::*;
pub use droid::*;
pub use extraction_backend::*;
pub use extraction_orchestrator::*;
pub use llm_extractor::*;
pub use pipeline::*;
pub use reporter::*;
pub use run_gate::*;
pub use session_fetcher::*;
pub use transient_document::*;
