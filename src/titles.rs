//! Best-effort page title lookup: bounded HTTP GET plus title extraction.

use futures::StreamExt as _;
use regex::Regex;
use std::sync::LazyLock;
use std::time::Duration;

/// Cap on how much of a response body is read while hunting for a title.
pub const MAX_BODY_BYTES: usize = 1 << 18;

/// Fallback when a page has no usable `<title>` element.
pub const DEFAULT_TITLE: &str = "No Title Found";

const FETCH_TIMEOUT: Duration = Duration::from_secs(10);

static TITLE_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<title[^>]*>([^<]*)").expect("hardcoded regex"));

/// Title lookup for a URL. Never fails loudly: the result is either a title
/// (possibly [`DEFAULT_TITLE`]) or `None` when the page could not be fetched
/// at all.
pub trait FetchTitle {
    fn fetch_title(&self, url: &str) -> impl Future<Output = Option<String>> + Send;
}

/// HTTP-backed implementation of [`FetchTitle`].
#[derive(Debug, Clone)]
pub struct TitleFetcher {
    client: reqwest::Client,
}

impl TitleFetcher {
    pub fn new() -> Self {
        let client = reqwest::Client::builder()
            .gzip(true)
            .timeout(FETCH_TIMEOUT)
            .build()
            .expect("hardcoded reqwest client config");

        Self { client }
    }
}

impl Default for TitleFetcher {
    fn default() -> Self {
        Self::new()
    }
}

impl FetchTitle for TitleFetcher {
    async fn fetch_title(&self, url: &str) -> Option<String> {
        let response = match self.client.get(url).send().await {
            Ok(response) => response,
            Err(error) => {
                tracing::debug!(%error, url, "title fetch failed");
                return None;
            }
        };

        let status = response.status();
        if status != reqwest::StatusCode::OK {
            tracing::debug!(url, %status, "title fetch returned non-200 status");
            return None;
        }

        let body = match read_capped(response).await {
            Ok(body) => body,
            Err(error) => {
                tracing::debug!(%error, url, "failed to read response body");
                return None;
            }
        };

        Some(extract_title(&body))
    }
}

/// Read at most [`MAX_BODY_BYTES`] of the response body, then stop without
/// draining the rest.
async fn read_capped(response: reqwest::Response) -> reqwest::Result<String> {
    let mut body: Vec<u8> = Vec::new();
    let mut stream = response.bytes_stream();

    while let Some(chunk) = stream.next().await {
        let chunk = chunk?;
        let remaining = MAX_BODY_BYTES - body.len();
        if chunk.len() >= remaining {
            body.extend_from_slice(&chunk[..remaining]);
            break;
        }
        body.extend_from_slice(&chunk);
    }

    Ok(String::from_utf8_lossy(&body).into_owned())
}

/// Text content of the first `<title>` element, case-insensitive tag match.
/// The closing tag is not required: a title whose `</title>` falls beyond
/// the body cap still yields its text, up to the next tag or end of input.
pub fn extract_title(body: &str) -> String {
    TITLE_PATTERN
        .captures(body)
        .and_then(|captures| captures.get(1))
        .map(|title| title.as_str().trim())
        .filter(|title| !title.is_empty())
        .map(str::to_owned)
        .unwrap_or_else(|| DEFAULT_TITLE.to_owned())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_simple_title() {
        let body = "<html><head><title>Example Page</title></head></html>";
        assert_eq!(extract_title(body), "Example Page");
    }

    #[test]
    fn tag_match_is_case_insensitive() {
        let body = "<HTML><TITLE>Shouty Page</TITLE></HTML>";
        assert_eq!(extract_title(body), "Shouty Page");
    }

    #[test]
    fn handles_attributes_and_whitespace() {
        let body = "<title lang=\"en\">\n  Padded Title\n</title>";
        assert_eq!(extract_title(body), "Padded Title");
    }

    #[test]
    fn first_title_wins() {
        let body = "<title>First</title><title>Second</title>";
        assert_eq!(extract_title(body), "First");
    }

    #[test]
    fn missing_title_yields_default() {
        assert_eq!(extract_title("<html><body>no title</body></html>"), DEFAULT_TITLE);
        assert_eq!(extract_title(""), DEFAULT_TITLE);
    }

    #[test]
    fn empty_title_yields_default() {
        assert_eq!(extract_title("<title>   </title>"), DEFAULT_TITLE);
    }

    #[test]
    fn unterminated_title_still_yields_text() {
        // A closing tag cut off by the body cap must not cost us the title.
        let body = "<html><head><title>Truncated Page";
        assert_eq!(extract_title(body), "Truncated Page");
    }

    #[tokio::test]
    async fn read_capped_truncates_oversized_bodies() {
        let oversized = "x".repeat(MAX_BODY_BYTES + 1024);
        let response = reqwest::Response::from(http::Response::new(oversized));

        let body = read_capped(response).await.expect("read should succeed");
        assert_eq!(body.len(), MAX_BODY_BYTES, "body must be cut at the cap");
    }

    #[tokio::test]
    async fn read_capped_returns_small_bodies_intact() {
        let response =
            reqwest::Response::from(http::Response::new("<title>Small</title>".to_owned()));

        let body = read_capped(response).await.expect("read should succeed");
        assert_eq!(body, "<title>Small</title>");
    }
}
