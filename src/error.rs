use thiserror::Error;

#[derive(Error, Debug)]
pub enum KarrosError {
    #[error("Not in a karros project. Run 'karros init' first.")]
    NotInitialized,

    #[error("Already initialized. Remove .karros/ to reinitialize.")]
    AlreadyInitialized,

    #[error("No live backend configured. Set up .karros/config.yaml or use --demo.")]
    NotConfigured,

    #[error("Config error: {0}")]
    Config(String),

    #[error("No {kind} matches '{id}'")]
    NoMatch { kind: &'static str, id: String },

    #[error("'{0}' matches more than one record. Use a longer prefix.")]
    AmbiguousId(String),

    #[error("Id prefix '{0}' is too short. Use at least 4 characters.")]
    ShortId(String),

    #[error("Use --force to delete in non-interactive mode")]
    NonInteractive,

    #[error("Load failed: {0}")]
    Load(String),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Upload(#[from] UploadError),

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

/// Failure reported by (or while talking to) a collection backend.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("Network error: {0}")]
    Transport(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("No record {id} in {collection}")]
    NotFound { collection: String, id: String },

    #[error("Rejected by store ({status}): {message}")]
    Rejected { status: u16, message: String },

    #[error("Malformed row: {0}")]
    Decode(String),

    #[error("Backend error: {0}")]
    Backend(String),
}

impl StoreError {
    pub fn not_found(collection: impl ToString, id: impl Into<String>) -> Self {
        StoreError::NotFound {
            collection: collection.to_string(),
            id: id.into(),
        }
    }
}

impl From<rusqlite::Error> for StoreError {
    fn from(err: rusqlite::Error) -> Self {
        StoreError::Backend(err.to_string())
    }
}

/// Object storage write failure. The adapter absorbs these.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Upload of {path} failed: {message}")]
pub struct UploadError {
    pub path: String,
    pub message: String,
}

/// Client-side precondition checked before any call reaches a backend.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Validation failed for '{field}': {message}")]
pub struct ValidationError {
    pub field: &'static str,
    pub message: String,
}

impl ValidationError {
    pub fn required(field: &'static str) -> Self {
        Self {
            field,
            message: format!("{} is required", field),
        }
    }
}

/// Reject blank (whitespace-only) required text fields.
pub fn require_text(field: &'static str, value: &str) -> std::result::Result<(), ValidationError> {
    if value.trim().is_empty() {
        Err(ValidationError::required(field))
    } else {
        Ok(())
    }
}

pub type Result<T> = std::result::Result<T, KarrosError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_store_error_message_passes_through() {
        let err: KarrosError = StoreError::Rejected {
            status: 409,
            message: "duplicate key value".to_string(),
        }
        .into();
        assert_eq!(err.to_string(), "Rejected by store (409): duplicate key value");
    }

    #[test]
    fn test_require_text() {
        assert!(require_text("title", "Save for deposit").is_ok());
        let err = require_text("title", "   ").unwrap_err();
        assert_eq!(err.field, "title");
        assert!(err.to_string().contains("title is required"));
    }

    #[test]
    fn test_not_found_names_collection() {
        let err = StoreError::not_found("sys_goals", "abc");
        assert_eq!(err.to_string(), "No record abc in sys_goals");
    }
}
