use std::{path::PathBuf, sync::Arc};

use serde_json::json;

use crate::domain::{parse_records, HtmlFragment, JobPosting};

use super::{
    ExtractionBackend, ExtractionRequest, ExtractionResult, Reporter, TransientDocument,
    EXTRACTION_MAX_TOKENS, EXTRACTION_TEMPERATURE, JOB_POSTING_INSTRUCTION, JOB_POSTING_SCHEMA,
};

pub struct ExtractionOrchestrator {
    backend: Arc<dyn ExtractionBackend>,
    scratch_dir: PathBuf,
}

impl ExtractionOrchestrator {
    pub fn new(backend: Arc<dyn ExtractionBackend>) -> Self {
        ExtractionOrchestrator {
            backend,
            scratch_dir: std::env::temp_dir(),
        }
    }

    pub fn with_scratch_dir(mut self, dir: PathBuf) -> Self {
        self.scratch_dir = dir;
        self
    }

    /// Runs the extraction backend over the fragment. Every failure is
    /// reported and turns into an empty result.
    pub async fn extract(&self, fragment: &HtmlFragment, reporter: &dyn Reporter) -> Vec<JobPosting> {
        let document = match TransientDocument::create_in(&self.scratch_dir, fragment).await {
            Ok(document) => document,
            Err(e) => {
                reporter.error(&format!("Failed to stage the harvested HTML: {}", e));
                return vec![];
            }
        };

        let records = self.run_backend(&document, reporter).await;
        document.discard().await;

        records
    }

    async fn run_backend(
        &self,
        document: &TransientDocument,
        reporter: &dyn Reporter,
    ) -> Vec<JobPosting> {
        let document_url = match document.url() {
            Ok(url) => url,
            Err(e) => {
                reporter.error(&format!("Failed to address the harvested HTML: {}", e));
                return vec![];
            }
        };

        let request = ExtractionRequest {
            document_url,
            instruction: JOB_POSTING_INSTRUCTION.to_string(),
            schema: JOB_POSTING_SCHEMA.to_string(),
            temperature: EXTRACTION_TEMPERATURE,
            max_tokens: EXTRACTION_MAX_TOKENS,
        };

        reporter.status("Running LLM extraction...");
        let results = match self.backend.run(request).await {
            Ok(results) => results,
            Err(e) => {
                reporter.error(&format!("Extraction failed: {}", e));
                return vec![];
            }
        };

        match results.into_iter().next() {
            Some(result) => interpret(result, reporter),
            None => {
                reporter.warning("Extraction backend returned no results.");
                vec![]
            }
        }
    }
}

fn interpret(result: ExtractionResult, reporter: &dyn Reporter) -> Vec<JobPosting> {
    if !result.success {
        match result.error_message {
            Some(reason) => reporter.error(&format!("Extraction failed: {}", reason)),
            None => reporter.error("Extraction failed."),
        }
        return vec![];
    }

    let content = result.extracted_content.unwrap_or_default();
    match parse_records(&content) {
        Ok(records) => {
            reporter.success(&format!(
                "Extraction successful! {} record(s) found.",
                records.len()
            ));
            records
        }
        Err(e) => {
            log::warn!("Extraction output is not valid JSON: {}", e);
            reporter.error("Failed to parse extraction output as JSON.");
            reporter.diagnostic(&json!({ "raw_content": content }).to_string());
            vec![]
        }
    }
}
