use async_trait::async_trait;
use serde::Deserialize;
use url::Url;

pub const JOB_POSTING_INSTRUCTION: &str = "You are analyzing LinkedIn activity feed HTML. Focus ONLY on the FIRST 3 posts at the TOP.
Extract the 'apply_link', 'eligibility', 'company_name', 'stipend', 'job_title', 'location', and 'timestamp'.
Return as a JSON array.";

pub const JOB_POSTING_SCHEMA: &str = r#"[{
    "apply_link": "string or null",
    "eligibility": "string or null",
    "company_name": "string or null",
    "stipend": "string or null",
    "job_title": "string or null",
    "location": "string or null",
    "timestamp": "string or null"
}]"#;

pub const EXTRACTION_TEMPERATURE: f32 = 0.0;
pub const EXTRACTION_MAX_TOKENS: u32 = 4096;

#[derive(Debug, Clone)]
pub struct ExtractionRequest {
    /// Address of the document to read, a `file://` URL for local documents.
    pub document_url: Url,
    pub instruction: String,
    pub schema: String,
    pub temperature: f32,
    pub max_tokens: u32,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ExtractionResult {
    pub success: bool,
    #[serde(default)]
    pub extracted_content: Option<String>,
    #[serde(default)]
    pub error_message: Option<String>,
}

impl ExtractionResult {
    pub fn succeeded(extracted_content: String) -> Self {
        ExtractionResult {
            success: true,
            extracted_content: Some(extracted_content),
            error_message: None,
        }
    }

    pub fn failed(error_message: String) -> Self {
        ExtractionResult {
            success: false,
            extracted_content: None,
            error_message: Some(error_message),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum BackendError {
    #[error("cannot load document from {0}")]
    UnsupportedDocument(String),
    #[error("failed to read document: {0}")]
    Document(#[from] std::io::Error),
    #[error("extraction backend is misconfigured: {0}")]
    Configuration(String),
    #[error("failed to build the extraction client: {0}")]
    Client(String),
}

/// Turns an addressable document into structured content, guided by a
/// natural-language instruction and a JSON schema.
#[async_trait]
pub trait ExtractionBackend: Send + Sync {
    async fn run(&self, request: ExtractionRequest) -> Result<Vec<ExtractionResult>, BackendError>;
}
