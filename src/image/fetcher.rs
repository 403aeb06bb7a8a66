use crate::config::FetchConfig;
use crate::utils::error::ClassifierError;
use crate::Result;
use async_trait::async_trait;
use axum::body::Bytes;
use reqwest::header::CONTENT_TYPE;
use reqwest::Url;
use std::sync::Arc;

/// Where image bytes come from. One GET, no retries.
#[async_trait]
pub trait ImageSource: Send + Sync {
    async fn get(&self, url: &Url) -> Result<Bytes>;
}

/// Raw bytes of the image the user pointed at.
#[derive(Debug, Clone)]
pub struct InputImage {
    pub url: String,
    pub bytes: Bytes,
}

/// Result of looking at the URL field.
#[derive(Debug, Clone)]
pub enum FetchOutcome {
    /// The field was empty; nothing to classify.
    NoInput,
    Fetched(InputImage),
}

pub struct HttpImageSource {
    client: reqwest::Client,
    max_bytes: usize,
}

impl HttpImageSource {
    pub fn new(config: &FetchConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .connect_timeout(config.connect_timeout)
            .user_agent(config.user_agent.clone())
            .build()
            .map_err(|e| ClassifierError::Config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            max_bytes: config.max_image_bytes,
        })
    }

    fn is_image_content_type(content_type: &str) -> bool {
        let mime = content_type
            .split(';')
            .next()
            .unwrap_or_default()
            .trim()
            .to_ascii_lowercase();
        mime.starts_with("image/") || mime == "application/octet-stream"
    }
}

#[async_trait]
impl ImageSource for HttpImageSource {
    async fn get(&self, url: &Url) -> Result<Bytes> {
        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(|e| ClassifierError::Fetch(format!("request to {} failed: {}", url, e)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ClassifierError::Fetch(format!("{} returned HTTP {}", url, status)));
        }

        if let Some(content_type) = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
        {
            if !Self::is_image_content_type(content_type) {
                return Err(ClassifierError::Fetch(format!(
                    "{} is not an image (content-type {})",
                    url, content_type
                )));
            }
        }

        if let Some(length) = response.content_length() {
            if length as usize > self.max_bytes {
                return Err(ClassifierError::FileTooLarge(length as usize, self.max_bytes));
            }
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| ClassifierError::Fetch(format!("reading body of {} failed: {}", url, e)))?;

        if bytes.len() > self.max_bytes {
            return Err(ClassifierError::FileTooLarge(bytes.len(), self.max_bytes));
        }

        Ok(bytes)
    }
}

/// Turns the text field into bytes, or reports that it was left empty.
#[derive(Clone)]
pub struct ImageFetcher {
    source: Arc<dyn ImageSource>,
}

impl ImageFetcher {
    pub fn new(source: Arc<dyn ImageSource>) -> Self {
        Self { source }
    }

    pub async fn fetch(&self, raw_url: &str) -> Result<FetchOutcome> {
        let raw_url = raw_url.trim();
        if raw_url.is_empty() {
            return Ok(FetchOutcome::NoInput);
        }

        let url = Self::parse_url(raw_url)?;
        let bytes = self.source.get(&url).await?;

        tracing::debug!("Fetched {} bytes from {}", bytes.len(), url);

        Ok(FetchOutcome::Fetched(InputImage {
            url: raw_url.to_string(),
            bytes,
        }))
    }

    pub fn parse_url(raw_url: &str) -> Result<Url> {
        let url = Url::parse(raw_url)
            .map_err(|e| ClassifierError::Fetch(format!("invalid URL {:?}: {}", raw_url, e)))?;

        match url.scheme() {
            "http" | "https" => Ok(url),
            other => Err(ClassifierError::Fetch(format!(
                "unsupported URL scheme {:?}",
                other
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CountingSource {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl ImageSource for CountingSource {
        async fn get(&self, _url: &Url) -> Result<Bytes> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(Bytes::from_static(b"bytes"))
        }
    }

    fn fetcher() -> (ImageFetcher, Arc<CountingSource>) {
        let source = Arc::new(CountingSource {
            calls: AtomicUsize::new(0),
        });
        (ImageFetcher::new(source.clone()), source)
    }

    #[tokio::test]
    async fn empty_input_is_not_a_failure() {
        let (fetcher, source) = fetcher();

        assert!(matches!(fetcher.fetch("").await.unwrap(), FetchOutcome::NoInput));
        assert!(matches!(fetcher.fetch("   ").await.unwrap(), FetchOutcome::NoInput));
        assert_eq!(source.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn fetches_once_without_retry() {
        let (fetcher, source) = fetcher();

        let outcome = fetcher.fetch(" https://example.com/rock.jpg ").await.unwrap();
        match outcome {
            FetchOutcome::Fetched(image) => {
                assert_eq!(image.url, "https://example.com/rock.jpg");
                assert_eq!(&image.bytes[..], b"bytes");
            }
            FetchOutcome::NoInput => panic!("expected fetched image"),
        }
        assert_eq!(source.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn malformed_urls_fail_as_fetch_errors() {
        let (fetcher, source) = fetcher();

        for bad in ["not a url", "ftp://example.com/a.png", "file:///etc/passwd"] {
            let err = fetcher.fetch(bad).await.unwrap_err();
            assert!(matches!(err, ClassifierError::Fetch(_)), "{}: {:?}", bad, err);
        }
        assert_eq!(source.calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn content_type_filter() {
        assert!(HttpImageSource::is_image_content_type("image/jpeg"));
        assert!(HttpImageSource::is_image_content_type("Image/PNG; charset=binary"));
        assert!(HttpImageSource::is_image_content_type("application/octet-stream"));
        assert!(!HttpImageSource::is_image_content_type("text/html; charset=utf-8"));
        assert!(!HttpImageSource::is_image_content_type("application/json"));
    }
}
