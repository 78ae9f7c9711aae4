use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

const MISSING: &str = "N/A";

/// One job posting pulled out of a feed post. Field order follows the
/// extraction schema.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct JobPosting {
    #[serde(default, deserialize_with = "deserialize_text")]
    pub apply_link: Option<String>,
    #[serde(default, deserialize_with = "deserialize_text")]
    pub eligibility: Option<String>,
    #[serde(default, deserialize_with = "deserialize_text")]
    pub company_name: Option<String>,
    #[serde(default, deserialize_with = "deserialize_text")]
    pub stipend: Option<String>,
    #[serde(default, deserialize_with = "deserialize_text")]
    pub job_title: Option<String>,
    #[serde(default, deserialize_with = "deserialize_text")]
    pub location: Option<String>,
    #[serde(default, deserialize_with = "deserialize_text")]
    pub timestamp: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldView {
    pub label: &'static str,
    pub value: String,
}

impl JobPosting {
    /// Company, title, location and timestamp.
    pub fn left_column(&self) -> Vec<FieldView> {
        vec![
            field("Company", &self.company_name),
            field("Job Title", &self.job_title),
            field("Location", &self.location),
            field("Timestamp", &self.timestamp),
        ]
    }

    /// Eligibility, stipend and apply link.
    pub fn right_column(&self) -> Vec<FieldView> {
        vec![
            field("Eligibility", &self.eligibility),
            field("Stipend", &self.stipend),
            field("Apply Link", &self.apply_link),
        ]
    }
}

fn field(label: &'static str, value: &Option<String>) -> FieldView {
    FieldView {
        label,
        value: value.clone().unwrap_or_else(|| MISSING.to_string()),
    }
}

/// Parses backend output into records. Accepts a JSON array of objects or a
/// single bare object.
pub fn parse_records(content: &str) -> Result<Vec<JobPosting>, serde_json::Error> {
    let value: Value = serde_json::from_str(content.trim())?;
    match value {
        Value::Object(_) => Ok(vec![serde_json::from_value(value)?]),
        other => serde_json::from_value(other),
    }
}

fn deserialize_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        None | Some(Value::Null) => None,
        Some(Value::String(s)) => {
            let s = s.trim();
            if s.is_empty() || s.eq_ignore_ascii_case("null") {
                None
            } else {
                Some(s.to_string())
            }
        }
        Some(Value::Number(n)) => Some(n.to_string()),
        Some(Value::Bool(b)) => Some(b.to_string()),
        Some(other) => Some(other.to_string()),
    })
}
