//! Body of the "start download" request.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A start request that failed local validation. Never reaches the network.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("url is required")]
    MissingUrl,
    #[error("output path is required")]
    MissingOutputPath,
}

/// What the user asked to download and where to put it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StartRequest {
    pub url: String,
    /// Left to server-side detection when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filename: Option<String>,
    pub output_path: String,
}

impl StartRequest {
    pub fn new(url: impl Into<String>, output_path: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            filename: None,
            output_path: output_path.into(),
        }
    }

    pub fn with_filename(mut self, filename: impl Into<String>) -> Self {
        self.filename = Some(filename.into());
        self
    }

    /// Trim fields and reject a missing url or output path.
    ///
    /// An empty filename is dropped so the service detects one itself.
    pub fn validate(self) -> Result<Self, ValidationError> {
        let url = self.url.trim().to_string();
        if url.is_empty() {
            return Err(ValidationError::MissingUrl);
        }
        let output_path = self.output_path.trim().to_string();
        if output_path.is_empty() {
            return Err(ValidationError::MissingOutputPath);
        }
        let filename = self
            .filename
            .map(|f| f.trim().to_string())
            .filter(|f| !f.is_empty());
        Ok(Self {
            url,
            filename,
            output_path,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validate_trims_and_drops_empty_filename() {
        let req = StartRequest::new("  https://x/a.zip ", " /d ")
            .with_filename("   ")
            .validate()
            .unwrap();
        assert_eq!(req.url, "https://x/a.zip");
        assert_eq!(req.output_path, "/d");
        assert!(req.filename.is_none());
    }

    #[test]
    fn validate_rejects_missing_fields() {
        assert_eq!(
            StartRequest::new("", "/d").validate(),
            Err(ValidationError::MissingUrl)
        );
        assert_eq!(
            StartRequest::new("https://x/a.zip", "  ").validate(),
            Err(ValidationError::MissingOutputPath)
        );
    }

    #[test]
    fn body_omits_absent_filename() {
        let v = serde_json::to_value(StartRequest::new("https://x/a.zip", "/d")).unwrap();
        assert_eq!(v["url"], "https://x/a.zip");
        assert_eq!(v["outputPath"], "/d");
        assert!(v.get("filename").is_none());
    }
}
