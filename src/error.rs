//! Content loading errors

use thiserror::Error;

/// Errors raised while reading content from a source
#[derive(Error, Debug)]
pub enum ContentError {
    /// The backing resource does not exist (missing file, HTTP 404, unknown id)
    #[error("content not found: {0}")]
    NotFound(String),

    /// The resource exists but is not valid structured data
    #[error("failed to parse {resource}: {source}")]
    Parse {
        resource: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to read {resource}: {source}")]
    Io {
        resource: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to fetch {resource}: {source}")]
    Http {
        resource: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("unexpected status {status} fetching {resource}")]
    Status { resource: String, status: u16 },
}

impl ContentError {
    /// Whether this error means "the thing asked for is absent"
    pub fn is_not_found(&self) -> bool {
        matches!(self, ContentError::NotFound(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_not_found() {
        let err = ContentError::NotFound("content/site.json".to_string());
        assert_eq!(err.to_string(), "content not found: content/site.json");
        assert!(err.is_not_found());
    }

    #[test]
    fn test_display_parse() {
        let source = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let err = ContentError::Parse {
            resource: "content/team.json".to_string(),
            source,
        };
        assert!(err.to_string().starts_with("failed to parse content/team.json"));
        assert!(!err.is_not_found());
    }

    #[test]
    fn test_display_status() {
        let err = ContentError::Status {
            resource: "content/articles.json".to_string(),
            status: 503,
        };
        assert_eq!(
            err.to_string(),
            "unexpected status 503 fetching content/articles.json"
        );
    }
}
