//! Report retrieval.

use std::path::PathBuf;
use std::time::Duration;

use crate::error::FetchError;

/// Where a status report comes from.
pub trait ReportSource {
    /// Retrieve the raw report text.
    fn fetch(&self) -> Result<String, FetchError>;

    /// Human readable location, for logs.
    fn location(&self) -> String;
}

/// Report served over HTTP by the device.
#[derive(Debug, Clone)]
pub struct HttpReportSource {
    url: String,
    client: reqwest::blocking::Client,
}

impl HttpReportSource {
    pub fn new(url: &str, timeout: Duration) -> Result<Self, FetchError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("fbxstats/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|source| FetchError::Transport {
                url: url.to_string(),
                source,
            })?;

        Ok(Self {
            url: url.to_string(),
            client,
        })
    }
}

impl ReportSource for HttpReportSource {
    fn fetch(&self) -> Result<String, FetchError> {
        let transport = |source: reqwest::Error| FetchError::Transport {
            url: self.url.clone(),
            source,
        };

        let response = self.client.get(&self.url).send().map_err(transport)?;
        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                url: self.url.clone(),
                status: status.as_u16(),
            });
        }

        response.text().map_err(transport)
    }

    fn location(&self) -> String {
        self.url.clone()
    }
}

/// Report saved to a file, for replaying a capture.
#[derive(Debug, Clone)]
pub struct FileReportSource {
    path: PathBuf,
}

impl FileReportSource {
    pub fn new<P: Into<PathBuf>>(path: P) -> Self {
        Self { path: path.into() }
    }
}

impl ReportSource for FileReportSource {
    fn fetch(&self) -> Result<String, FetchError> {
        std::fs::read_to_string(&self.path).map_err(|source| FetchError::Io {
            path: self.path.clone(),
            source,
        })
    }

    fn location(&self) -> String {
        self.path.display().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_file_source() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "Adsl\n====\n").unwrap();

        let source = FileReportSource::new(file.path());
        assert_eq!(source.fetch().unwrap(), "Adsl\n====\n");
        assert_eq!(source.location(), file.path().display().to_string());
    }

    #[test]
    fn test_missing_file() {
        let source = FileReportSource::new("/nonexistent/fbx_info.txt");
        assert!(matches!(source.fetch(), Err(FetchError::Io { .. })));
    }

    #[test]
    fn test_http_source_builds() {
        let source =
            HttpReportSource::new("http://127.0.0.1:9/pub/fbx_info.txt", Duration::from_secs(1))
                .unwrap();
        assert_eq!(source.location(), "http://127.0.0.1:9/pub/fbx_info.txt");
    }
}
