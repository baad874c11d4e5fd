use std::collections::BTreeMap;

use thiserror::Error;

use crate::profile::ProfileField;

/// Failure against the local device store.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Failed to open device store at {path}: {reason}")]
    Open { path: String, reason: String },

    #[error("Failed to read '{key}': {reason}")]
    Read { key: String, reason: String },

    #[error("Failed to write '{key}': {reason}")]
    Write { key: String, reason: String },

    #[error("Failed to remove '{key}': {reason}")]
    Remove { key: String, reason: String },

    #[error("Failed to serialize profile: {0}")]
    Serialize(String),
}

/// Any failure of an AI-backed call. Views show it as a single message.
#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("Unsupported AI provider: '{0}'. Supported: gemini, claude, openai, openrouter")]
    UnsupportedProvider(String),

    #[error("No API key configured for '{0}'")]
    MissingApiKey(String),

    #[error("Failed to build HTTP client: {0}")]
    Client(String),

    #[error("LLM API timeout after {seconds}s for provider '{provider}'")]
    Timeout { provider: String, seconds: u64 },

    #[error("LLM API request failed for {provider}: {reason}")]
    Transport { provider: String, reason: String },

    #[error("LLM API error: {status} from {provider} - {body}")]
    Status {
        provider: String,
        status: u16,
        body: String,
    },

    #[error("The model returned no output")]
    EmptyOutput,

    #[error("Failed to parse model output as JSON: {0}")]
    MalformedOutput(String),

    #[error("Model output does not match the expected schema: {0}")]
    SchemaMismatch(String),

    #[error("Invalid photo data URI: {0}")]
    InvalidPhoto(String),

    #[error("{0}")]
    Precondition(String),
}

/// Per-field form validation messages, keyed by field.
#[derive(Debug, Clone, Default, PartialEq, Eq, Error)]
#[error("{} invalid field(s)", .fields.len())]
pub struct ValidationErrors {
    pub fields: BTreeMap<ProfileField, String>,
}

impl ValidationErrors {
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn get(&self, field: ProfileField) -> Option<&str> {
        self.fields.get(&field).map(String::as_str)
    }

    pub(crate) fn insert(&mut self, field: ProfileField, message: impl Into<String>) {
        self.fields.entry(field).or_insert_with(|| message.into());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gateway_error_messages() {
        let err = GatewayError::Timeout {
            provider: "gemini".to_string(),
            seconds: 60,
        };
        assert_eq!(err.to_string(), "LLM API timeout after 60s for provider 'gemini'");

        let err = GatewayError::UnsupportedProvider("bard".to_string());
        assert!(err.to_string().contains("'bard'"));
    }

    #[test]
    fn test_validation_errors_keep_first_message() {
        let mut errors = ValidationErrors::default();
        errors.insert(ProfileField::Protein, "Protein must be a number.");
        errors.insert(ProfileField::Protein, "Protein must be non-negative.");

        assert_eq!(errors.fields.len(), 1);
        assert_eq!(
            errors.get(ProfileField::Protein),
            Some("Protein must be a number.")
        );
        assert!(errors.get(ProfileField::Fat).is_none());
    }
}
