//! Discovery document retrieval with an on-disk cache.

use std::path::PathBuf;
use std::time::Duration;

use tracing::{debug, warn};

/// Environment variable overriding the cache directory.
pub const CACHE_DIR_ENV: &str = "DISCOGEN_CACHE_DIR";

const CACHE_FILE_PREFIX: &str = "google-api-cache-";

const MAX_RETRIES: u32 = 5;
const INITIAL_DELAY_MS: u64 = 125;

/// Retry an async operation with exponential backoff.
async fn fetch_with_retry<T, F, Fut>(operation: F, operation_name: &str) -> Result<T, String>
where
    F: Fn() -> Fut,
    Fut: Future<Output = Result<T, String>>,
{
    let mut last_error = String::new();
    for attempt in 0..MAX_RETRIES {
        match operation().await {
            Ok(result) => return Ok(result),
            Err(e) => {
                last_error = e;
                if attempt < MAX_RETRIES - 1 {
                    let delay = INITIAL_DELAY_MS * (1 << attempt);
                    warn!(
                        attempt = attempt + 1,
                        max_retries = MAX_RETRIES,
                        delay_ms = delay,
                        operation = operation_name,
                        error = %last_error,
                        "HTTP request failed, retrying"
                    );
                    tokio::time::sleep(Duration::from_millis(delay)).await;
                }
            }
        }
    }
    Err(format!(
        "{operation_name}: {last_error} (after {MAX_RETRIES} retries)"
    ))
}

/// Cache file name for `url`: the prefix plus the URL, query-escaped.
pub fn cache_file_name(url: &str) -> String {
    let escaped: String = url::form_urlencoded::byte_serialize(url.as_bytes()).collect();
    format!("{CACHE_FILE_PREFIX}{escaped}")
}

/// Fetches URLs, reading and writing the cache directory unless disabled.
#[derive(Debug, Clone)]
pub struct Fetcher {
    http: reqwest::Client,
    cache_dir: PathBuf,
    use_cache: bool,
}

impl Fetcher {
    /// A fetcher caching under `cache_dir` when `use_cache` is set.
    pub fn new(http: reqwest::Client, cache_dir: PathBuf, use_cache: bool) -> Self {
        Self {
            http,
            cache_dir,
            use_cache,
        }
    }

    /// Cache in `DISCOGEN_CACHE_DIR`, or the OS temp dir when unset.
    pub fn from_env(use_cache: bool) -> Self {
        let cache_dir = std::env::var_os(CACHE_DIR_ENV)
            .map(PathBuf::from)
            .unwrap_or_else(std::env::temp_dir);
        Self::new(reqwest::Client::new(), cache_dir, use_cache)
    }

    /// Body of `url` as text. A cached copy is returned without touching
    /// the network; a fresh download is written back to the cache.
    pub async fn fetch(&self, url: &str) -> Result<String, String> {
        let cache_path = self.cache_dir.join(cache_file_name(url));
        if self.use_cache
            && let Ok(cached) = std::fs::read_to_string(&cache_path)
        {
            debug!(url, path = %cache_path.display(), "Using cached document");
            return Ok(cached);
        }

        let body = fetch_with_retry(move || self.get(url), &format!("fetch {url}")).await?;

        if self.use_cache
            && let Err(err) = std::fs::create_dir_all(&self.cache_dir)
                .and_then(|()| std::fs::write(&cache_path, &body))
        {
            warn!(path = %cache_path.display(), error = %err, "Failed to write cache file");
        }
        Ok(body)
    }

    async fn get(&self, url: &str) -> Result<String, String> {
        debug!(url, "Downloading");
        let res = self
            .http
            .get(url)
            .send()
            .await
            .map_err(|e| format!("request failed: {e}"))?;
        let status = res.status();
        if !status.is_success() {
            return Err(format!("bad HTTP response code {status}"));
        }
        res.text()
            .await
            .map_err(|e| format!("failed to read response body: {e}"))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[test]
    fn test_cache_file_name_escapes_url() {
        assert_eq!(
            cache_file_name("https://x.test/a/b?c=d"),
            "google-api-cache-https%3A%2F%2Fx.test%2Fa%2Fb%3Fc%3Dd"
        );
    }

    #[tokio::test]
    async fn test_fetch_writes_then_reads_cache() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/doc"))
            .respond_with(ResponseTemplate::new(200).set_body_string("{\"id\":\"a\"}"))
            .expect(1)
            .mount(&server)
            .await;

        let dir = tempfile::tempdir().unwrap();
        let fetcher = Fetcher::new(reqwest::Client::new(), dir.path().to_path_buf(), true);
        let url = format!("{}/doc", server.uri());

        assert_eq!(fetcher.fetch(&url).await.unwrap(), "{\"id\":\"a\"}");
        let cached = dir.path().join(cache_file_name(&url));
        assert_eq!(std::fs::read_to_string(cached).unwrap(), "{\"id\":\"a\"}");

        // Second call is served from disk; the mock expects one hit.
        assert_eq!(fetcher.fetch(&url).await.unwrap(), "{\"id\":\"a\"}");
    }

    #[tokio::test]
    async fn test_no_cache_skips_disk() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string("fresh"))
            .expect(2)
            .mount(&server)
            .await;

        let dir = tempfile::tempdir().unwrap();
        let url = format!("{}/doc", server.uri());
        std::fs::write(dir.path().join(cache_file_name(&url)), "stale").unwrap();

        let fetcher = Fetcher::new(reqwest::Client::new(), dir.path().to_path_buf(), false);
        assert_eq!(fetcher.fetch(&url).await.unwrap(), "fresh");
        assert_eq!(fetcher.fetch(&url).await.unwrap(), "fresh");
    }

    #[tokio::test]
    async fn test_retry_gives_up_with_context() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(503))
            .expect(5)
            .mount(&server)
            .await;

        let dir = tempfile::tempdir().unwrap();
        let fetcher = Fetcher::new(reqwest::Client::new(), dir.path().to_path_buf(), true);
        let url = format!("{}/doc", server.uri());
        let err = fetcher.fetch(&url).await.unwrap_err();
        assert!(err.contains("bad HTTP response code 503"), "{err}");
        assert!(err.ends_with("(after 5 retries)"), "{err}");
        assert!(!dir.path().join(cache_file_name(&url)).exists());
    }
}
