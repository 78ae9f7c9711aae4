use std::time::Duration;

use async_openai::{
    config::OpenAIConfig,
    error::OpenAIError,
    types::{ChatCompletionRequestUserMessageArgs, CreateChatCompletionRequestArgs},
    Client,
};
use async_trait::async_trait;
use url::Url;

use crate::configuration::ExtractionSettings;

use super::{
    html_text::{readable_text, truncate_chars},
    BackendError, ExtractionBackend, ExtractionRequest, ExtractionResult,
};

const MAX_CONTENT_CHARS: usize = 60_000;

const KNOWN_PROVIDERS: [(&str, &str); 4] = [
    ("groq", "https://api.groq.com/openai/v1"),
    ("openai", "https://api.openai.com/v1"),
    ("deepseek", "https://api.deepseek.com/v1"),
    ("ollama", "http://localhost:11434/v1"),
];

#[derive(Debug, Clone, PartialEq)]
pub struct ProviderRoute {
    pub api_base: String,
    pub model: String,
}

/// Splits `<provider>/<model>` and finds the OpenAI-compatible API base for
/// the provider. `api_base` wins over the built-in table.
pub fn resolve_provider(
    provider: &str,
    api_base: Option<&str>,
) -> Result<ProviderRoute, BackendError> {
    let (prefix, model) = provider.split_once('/').ok_or_else(|| {
        BackendError::Configuration(format!(
            "provider `{}` is not of the form <provider>/<model>",
            provider
        ))
    })?;
    if model.trim().is_empty() {
        return Err(BackendError::Configuration(format!(
            "provider `{}` names no model",
            provider
        )));
    }

    let api_base = match api_base.map(str::trim).filter(|base| !base.is_empty()) {
        Some(base) => base.trim_end_matches('/').to_string(),
        None => KNOWN_PROVIDERS
            .iter()
            .find(|(name, _)| name.eq_ignore_ascii_case(prefix))
            .map(|(_, base)| base.to_string())
            .ok_or_else(|| {
                BackendError::Configuration(format!(
                    "unknown provider `{}`; set extraction.api_base",
                    prefix
                ))
            })?,
    };

    Ok(ProviderRoute {
        api_base,
        model: model.to_string(),
    })
}

#[derive(Debug, thiserror::Error)]
enum CompletionError {
    #[error(transparent)]
    Api(#[from] OpenAIError),
    #[error("the model returned no content")]
    Empty,
}

/// Extraction backend that asks a chat-completion model to fill the schema.
pub struct LlmExtractor {
    settings: ExtractionSettings,
    route: ProviderRoute,
    api_key: String,
}

impl LlmExtractor {
    pub fn new(settings: ExtractionSettings, api_key: String) -> Result<Self, BackendError> {
        let route = resolve_provider(&settings.provider, settings.api_base.as_deref())?;

        Ok(LlmExtractor {
            settings,
            route,
            api_key,
        })
    }

    // A fresh client per run; nothing is cached between runs.
    fn client(&self) -> Result<Client<OpenAIConfig>, BackendError> {
        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(self.settings.request_timeout_secs))
            .build()
            .map_err(|e| BackendError::Client(e.to_string()))?;
        let config = OpenAIConfig::new()
            .with_api_base(&self.route.api_base)
            .with_api_key(&self.api_key);

        Ok(Client::with_config(config).with_http_client(http_client))
    }

    async fn complete(
        &self,
        client: &Client<OpenAIConfig>,
        prompt: &str,
        request: &ExtractionRequest,
    ) -> Result<String, CompletionError> {
        let chat_request = CreateChatCompletionRequestArgs::default()
            .model(&self.route.model)
            .messages([ChatCompletionRequestUserMessageArgs::default()
                .content(prompt)
                .build()?
                .into()])
            .temperature(request.temperature)
            .max_tokens(request.max_tokens)
            .build()?;

        let response = client.chat().create(chat_request).await?;
        log::info!(
            "Extraction model {} answered with {} choice(s)",
            self.route.model,
            response.choices.len()
        );

        response
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .filter(|content| !content.trim().is_empty())
            .ok_or(CompletionError::Empty)
    }
}

#[async_trait]
impl ExtractionBackend for LlmExtractor {
    async fn run(&self, request: ExtractionRequest) -> Result<Vec<ExtractionResult>, BackendError> {
        let html = load_document(&request.document_url).await?;
        let text = readable_text(&html);
        let content = truncate_chars(&text, MAX_CONTENT_CHARS);
        if content.len() < text.len() {
            log::warn!(
                "Document reduced to {} chars, truncated to {}",
                text.chars().count(),
                MAX_CONTENT_CHARS
            );
        }

        let prompt = build_prompt(&request, content);
        let client = self.client()?;

        match self.complete(&client, &prompt, &request).await {
            Ok(answer) => Ok(vec![ExtractionResult::succeeded(unwrap_blocks(&answer))]),
            Err(e) => {
                log::error!("Extraction request to {} failed: {}", self.route.api_base, e);
                Ok(vec![ExtractionResult::failed(e.to_string())])
            }
        }
    }
}

async fn load_document(url: &Url) -> Result<String, BackendError> {
    if url.scheme() != "file" {
        return Err(BackendError::UnsupportedDocument(url.to_string()));
    }
    let path = url
        .to_file_path()
        .map_err(|_| BackendError::UnsupportedDocument(url.to_string()))?;

    Ok(tokio::fs::read_to_string(path).await?)
}

pub fn build_prompt(request: &ExtractionRequest, content: &str) -> String {
    format!(
        r#"Here is the content from the URL:
<url>{url}</url>

<url_content>
{content}
</url_content>

The user has made the following request for what information to extract from the above content:

<user_request>
{instruction}
</user_request>

<schema_block>
{schema}
</schema_block>

Read the content carefully and extract exactly what the request asks for, following the schema.
Use null for any field the content does not state. Do not invent values.
Return only the JSON, wrapped in <blocks>...</blocks> tags."#,
        url = request.document_url,
        content = content,
        instruction = request.instruction,
        schema = request.schema,
    )
}

/// Pulls the payload out of `<blocks>` tags or a Markdown code fence.
pub fn unwrap_blocks(answer: &str) -> String {
    let answer = answer.trim();

    if let Some(start) = answer.find("<blocks>") {
        let inner = &answer[start + "<blocks>".len()..];
        let inner = match inner.find("</blocks>") {
            Some(end) => &inner[..end],
            None => inner,
        };
        return strip_fence(inner.trim()).to_string();
    }

    strip_fence(answer).to_string()
}

fn strip_fence(text: &str) -> &str {
    let Some(rest) = text.strip_prefix("```") else {
        return text;
    };
    // Drop the info string (```json) up to the end of the first line.
    let rest = match rest.find('\n') {
        Some(newline) => &rest[newline + 1..],
        None => rest,
    };

    rest.trim_end().trim_end_matches("```").trim()
}

#[cfg(test)]
mod tests {
    use url::Url;

    use super::*;
    use crate::services::{JOB_POSTING_INSTRUCTION, JOB_POSTING_SCHEMA};

    fn settings(provider: &str) -> ExtractionSettings {
        ExtractionSettings {
            provider: provider.to_string(),
            api_base: None,
            temperature: 0.0,
            max_tokens: 4096,
            request_timeout_secs: 30,
        }
    }

    fn request(url: &str) -> ExtractionRequest {
        ExtractionRequest {
            document_url: Url::parse(url).unwrap(),
            instruction: JOB_POSTING_INSTRUCTION.to_string(),
            schema: JOB_POSTING_SCHEMA.to_string(),
            temperature: 0.0,
            max_tokens: 4096,
        }
    }

    #[test]
    fn providers_resolve_to_api_bases() {
        let route =
            resolve_provider("groq/meta-llama/llama-4-scout-17b-16e-instruct", None).unwrap();
        assert_eq!(route.api_base, "https://api.groq.com/openai/v1");
        assert_eq!(route.model, "meta-llama/llama-4-scout-17b-16e-instruct");

        let route = resolve_provider("acme/model-x", Some("http://llm.internal/v1/")).unwrap();
        assert_eq!(route.api_base, "http://llm.internal/v1");
    }

    #[test]
    fn bad_providers_are_configuration_errors() {
        assert!(matches!(
            resolve_provider("acme/model-x", None),
            Err(BackendError::Configuration(_))
        ));
        assert!(matches!(
            resolve_provider("groq", None),
            Err(BackendError::Configuration(_))
        ));
        assert!(matches!(
            resolve_provider("groq/", None),
            Err(BackendError::Configuration(_))
        ));
        assert!(LlmExtractor::new(settings("nobody/model"), "key".to_string()).is_err());
        assert!(LlmExtractor::new(settings("openai/gpt-4o-mini"), "key".to_string()).is_ok());
    }

    #[test]
    fn answers_are_unwrapped() {
        assert_eq!(unwrap_blocks("<blocks>[{\"a\":1}]</blocks>"), "[{\"a\":1}]");
        assert_eq!(
            unwrap_blocks("Sure!\n<blocks>\n```json\n[]\n```\n</blocks>"),
            "[]"
        );
        assert_eq!(unwrap_blocks("```json\n[{\"a\":1}]\n```"), "[{\"a\":1}]");
        assert_eq!(unwrap_blocks("  [1]  "), "[1]");
    }

    #[test]
    fn prompt_carries_instruction_schema_and_content() {
        let request = request("file:///tmp/feed.html");
        let prompt = build_prompt(&request, "Hiring at Acme");

        assert!(prompt.contains("<url>file:///tmp/feed.html</url>"));
        assert!(prompt.contains("Hiring at Acme"));
        assert!(prompt.contains("FIRST 3 posts at the TOP"));
        assert!(prompt.contains("\"stipend\": \"string or null\""));
    }

    #[tokio::test]
    async fn only_local_documents_are_loaded() {
        let result = load_document(&Url::parse("https://www.linkedin.com/feed/").unwrap()).await;

        assert!(matches!(result, Err(BackendError::UnsupportedDocument(_))));
    }

    #[tokio::test]
    async fn missing_document_is_a_backend_error() {
        let extractor = LlmExtractor::new(settings("groq/llama"), "key".to_string()).unwrap();
        let path = std::env::temp_dir().join(format!("feedreap-gone-{}.html", uuid::Uuid::new_v4()));
        let url = Url::from_file_path(&path).unwrap();

        let result = extractor.run(request(url.as_str())).await;

        assert!(matches!(result, Err(BackendError::Document(_))));
    }
}
