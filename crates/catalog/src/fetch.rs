use std::path::Path;

use anyhow::Result;
use renderer::{FetchError, ShaderRef, SourceProvider};
use reqwest::blocking::Client;
use tracing::debug;

/// Blocking fetcher for the two reference shapes the catalog produces:
/// `http(s)://` URLs and local file paths.
#[derive(Debug)]
pub struct SourceClient {
    http: Client,
}

impl SourceClient {
    pub fn new() -> Result<Self> {
        let http = Client::builder().build()?;
        Ok(Self { http })
    }

    fn fetch_url(&self, reference: &ShaderRef) -> Result<String, FetchError> {
        let response = self
            .http
            .get(reference.as_str())
            .send()
            .map_err(|err| FetchError::Network {
                reference: reference.to_string(),
                message: err.to_string(),
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                reference: reference.to_string(),
                status: status.as_u16(),
            });
        }

        response.text().map_err(|err| FetchError::Network {
            reference: reference.to_string(),
            message: err.to_string(),
        })
    }

    fn fetch_file(&self, reference: &ShaderRef) -> Result<String, FetchError> {
        let path = Path::new(reference.as_str());
        match std::fs::read_to_string(path) {
            Ok(text) => Ok(text),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                Err(FetchError::NotFound(reference.to_string()))
            }
            Err(err) => Err(FetchError::Io {
                reference: reference.to_string(),
                message: err.to_string(),
            }),
        }
    }
}

impl SourceProvider for SourceClient {
    fn fetch_text(&self, reference: &ShaderRef) -> Result<String, FetchError> {
        debug!(%reference, "fetching shader source");
        let raw = reference.as_str();
        if raw.starts_with("http://") || raw.starts_with("https://") {
            self.fetch_url(reference)
        } else {
            self.fetch_file(reference)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fetches_local_files() {
        let temp = tempfile::tempdir().unwrap();
        let path = temp.path().join("demo.frag");
        std::fs::write(&path, "void main() { gl_FragColor = vec4(1.0); }").unwrap();

        let client = SourceClient::new().unwrap();
        let reference = ShaderRef::new(path.to_string_lossy().into_owned());
        let text = client.fetch_text(&reference).expect("file fetch succeeds");
        assert!(text.contains("gl_FragColor"));
    }

    #[test]
    fn missing_files_report_not_found() {
        let temp = tempfile::tempdir().unwrap();
        let reference = ShaderRef::new(
            temp.path()
                .join("missing.frag")
                .to_string_lossy()
                .into_owned(),
        );

        let client = SourceClient::new().unwrap();
        let error = client.fetch_text(&reference).unwrap_err();
        assert!(matches!(error, FetchError::NotFound(_)));
    }

    #[test]
    fn directories_report_io_errors() {
        let temp = tempfile::tempdir().unwrap();
        let reference = ShaderRef::new(temp.path().to_string_lossy().into_owned());

        let client = SourceClient::new().unwrap();
        let error = client.fetch_text(&reference).unwrap_err();
        assert!(matches!(error, FetchError::Io { .. }));
    }
}
