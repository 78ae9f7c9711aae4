use std::time::Duration;

use serde::Deserialize;
use serde_aux::field_attributes::deserialize_number_from_string;

#[derive(Deserialize, Clone)]
pub struct Settings {
    pub application: ApplicationSettings,
    pub browser: BrowserSettings,
    pub fetcher: FetcherSettings,
    pub extraction: ExtractionSettings,
    pub api_keys: ApiKeys,
}

impl Settings {
    /// Checks what deserialization alone cannot, such as a key supplied as
    /// blank text.
    pub fn validate(&self) -> Result<(), config::ConfigError> {
        self.api_keys.validate()
    }
}

#[derive(Deserialize, Clone)]
pub struct ApplicationSettings {
    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub port: u16,
    pub host: String,
    pub default_target: String,
}

#[derive(Deserialize, Clone)]
pub struct BrowserSettings {
    pub webdriver_url: String,
    pub headless: bool,
    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub window_width: u32,
    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub window_height: u32,
}

#[derive(Deserialize, Clone)]
pub struct FetcherSettings {
    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub navigation_timeout_secs: u64,
    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub settle_delay_secs: u64,
    pub cookie_name: String,
    pub cookie_domain: String,
}

impl FetcherSettings {
    pub fn navigation_timeout(&self) -> Duration {
        Duration::from_secs(self.navigation_timeout_secs)
    }

    pub fn settle_delay(&self) -> Duration {
        Duration::from_secs(self.settle_delay_secs)
    }
}

impl Default for FetcherSettings {
    fn default() -> Self {
        FetcherSettings {
            navigation_timeout_secs: 60,
            settle_delay_secs: 5,
            cookie_name: "li_at".to_string(),
            cookie_domain: ".linkedin.com".to_string(),
        }
    }
}

#[derive(Deserialize, Clone)]
pub struct ExtractionSettings {
    /// `<provider>/<model>`, e.g. `groq/meta-llama/llama-4-scout-17b-16e-instruct`.
    pub provider: String,
    /// Overrides the API base derived from the provider prefix.
    pub api_base: Option<String>,
    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub temperature: f32,
    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub max_tokens: u32,
    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub request_timeout_secs: u64,
}

#[derive(Deserialize, Clone)]
pub struct ApiKeys {
    pub llm: String,
}

impl ApiKeys {
    pub fn validate(&self) -> Result<(), config::ConfigError> {
        if self.llm.trim().is_empty() {
            return Err(config::ConfigError::Message(
                "api_keys.llm is empty; set APP_API_KEYS__LLM".to_string(),
            ));
        }
        Ok(())
    }
}

// Keeps the key out of any accidental `{:?}` of the settings tree.
impl std::fmt::Debug for ApiKeys {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiKeys").field("llm", &"[redacted]").finish()
    }
}

pub enum Environment {
    Local,
    Production,
}

impl Environment {
    pub fn as_str(&self) -> &'static str {
        match self {
            Environment::Local => "local",
            Environment::Production => "production",
        }
    }
}

impl TryFrom<String> for Environment {
    type Error = String;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        match s.to_lowercase().as_str() {
            "local" => Ok(Self::Local),
            "production" => Ok(Self::Production),
            other => Err(format!(
                "{} is not a supported environment. Use either `local` or `production`.",
                other
            )),
        }
    }
}

pub fn get_configuration() -> Result<Settings, config::ConfigError> {
    let base_path = std::env::current_dir().map_err(|e| {
        config::ConfigError::Message(format!("Failed to determine the current directory: {}", e))
    })?;
    let configuration_directory = base_path.join("configuration");

    let environment: Environment = std::env::var("APP_ENVIRONMENT")
        .unwrap_or_else(|_| "local".into())
        .try_into()
        .map_err(config::ConfigError::Message)?;
    let environment_filename = format!("{}.yaml", environment.as_str());

    let settings = config::Config::builder()
        .add_source(config::File::from(configuration_directory.join("base.yaml")))
        .add_source(config::File::from(
            configuration_directory.join(environment_filename),
        ))
        // APP_APPLICATION__PORT=5001 sets `Settings.application.port`,
        // APP_API_KEYS__LLM sets the extraction provider's key.
        .add_source(
            config::Environment::with_prefix("APP")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        )
        .build()?;

    let settings = settings.try_deserialize::<Settings>()?;
    settings.validate()?;

    Ok(settings)
}

#[cfg(test)]
mod tests {
    use super::{
        ApiKeys, ApplicationSettings, BrowserSettings, Environment, ExtractionSettings,
        FetcherSettings, Settings,
    };

    fn settings_with_key(llm: &str) -> Settings {
        Settings {
            application: ApplicationSettings {
                port: 8000,
                host: "127.0.0.1".to_string(),
                default_target: "https://www.linkedin.com/feed/".to_string(),
            },
            browser: BrowserSettings {
                webdriver_url: "http://localhost:9515".to_string(),
                headless: true,
                window_width: 1920,
                window_height: 1080,
            },
            fetcher: FetcherSettings::default(),
            extraction: ExtractionSettings {
                provider: "groq/meta-llama/llama-4-scout-17b-16e-instruct".to_string(),
                api_base: None,
                temperature: 0.0,
                max_tokens: 4096,
                request_timeout_secs: 120,
            },
            api_keys: ApiKeys {
                llm: llm.to_string(),
            },
        }
    }

    #[test]
    fn settings_without_llm_key_are_rejected() {
        assert!(settings_with_key("").validate().is_err());
        assert!(settings_with_key("  ").validate().is_err());
        assert!(settings_with_key("gsk_live_secret").validate().is_ok());
    }

    #[test]
    fn environment_parses_case_insensitively() {
        assert!(matches!(
            Environment::try_from("Production".to_string()),
            Ok(Environment::Production)
        ));
        assert!(Environment::try_from("staging".to_string()).is_err());
    }

    #[test]
    fn blank_api_key_is_a_configuration_error() {
        for llm in ["", "   ", "\t\n"] {
            let keys = ApiKeys {
                llm: llm.to_string(),
            };
            let err = keys.validate().unwrap_err();

            assert!(err.to_string().contains("APP_API_KEYS__LLM"));
        }
    }

    #[test]
    fn present_api_key_passes_validation() {
        let keys = ApiKeys {
            llm: "gsk_live_secret".to_string(),
        };

        assert!(keys.validate().is_ok());
    }

    #[test]
    fn api_key_is_redacted_in_debug() {
        let keys = ApiKeys {
            llm: "gsk_live_secret".to_string(),
        };
        let printed = format!("{:?}", keys);

        assert!(!printed.contains("gsk_live_secret"));
        assert!(printed.contains("redacted"));
    }
}
