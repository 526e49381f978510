//! Per-message dispatch: ignore policy, URL extraction, handler fan-out.

use crate::seen::{SeenQueryHandler, SeenStore, SeenTracker};
use crate::titles::FetchTitle;
use crate::urls::{UrlManager, UrlStore};
use crate::{InboundMessage, OutboundMessage};

use regex::Regex;
use sqlx::SqlitePool;
use std::sync::{Arc, LazyLock};
use tokio::sync::mpsc::UnboundedSender;
use tracing::Instrument as _;

/// Matches the first URL-like substring in a message.
static URL_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"http(s)?\S*").expect("hardcoded regex"));

/// Dispatcher configuration, resolved once at startup and injected rather
/// than rebuilt per message.
#[derive(Debug, Clone)]
pub struct DispatcherConfig {
    /// Channel the bot announces into.
    pub room: String,
    /// Pattern tested against lowercased author nicks.
    pub ignore: Regex,
}

/// Entry point for every inbound message. Applies the ignore policy, then
/// fans out to the URL, seen-tracking, and seen-query handlers as detached
/// tasks.
pub struct Dispatcher<F> {
    ignore: Regex,
    urls: Arc<UrlManager<F>>,
    seen: Arc<SeenTracker>,
    seen_queries: Arc<SeenQueryHandler>,
}

impl<F> Dispatcher<F>
where
    F: FetchTitle + Send + Sync + 'static,
{
    pub fn new(
        config: DispatcherConfig,
        pool: SqlitePool,
        fetcher: F,
        outbound: UnboundedSender<OutboundMessage>,
    ) -> Self {
        let urls = Arc::new(UrlManager::new(
            UrlStore::new(pool.clone()),
            fetcher,
            outbound.clone(),
            config.room.clone(),
        ));
        let seen = Arc::new(SeenTracker::new(SeenStore::new(pool.clone())));
        let seen_queries = Arc::new(SeenQueryHandler::new(
            SeenStore::new(pool),
            outbound,
            config.room,
        ));

        Self {
            ignore: config.ignore,
            urls,
            seen,
            seen_queries,
        }
    }

    /// Handle one inbound message. Never blocks: each handler runs as a
    /// fire-and-forget tokio task that owns its error handling, so the
    /// transport receive loop gets control back immediately.
    ///
    /// Messages from ignored authors are dropped entirely, seen-tracking
    /// included.
    pub fn dispatch(&self, message: InboundMessage) {
        if is_ignored(&self.ignore, &message.author) {
            tracing::info!(author = %message.author, "message from ignored user");
            return;
        }

        if let Some(url) = extract_url(&message.text) {
            let urls = self.urls.clone();
            let url = url.to_owned();
            let author = message.author.clone();
            let span = tracing::info_span!("url.handle", url = %url, author = %author);
            tokio::spawn(async move { urls.handle_url(&url, &author).await }.instrument(span));
        }

        let seen = self.seen.clone();
        let observed = message.clone();
        let span = tracing::info_span!("seen.track", author = %message.author);
        tokio::spawn(
            async move { seen.observe(&observed.author, &observed.text).await }.instrument(span),
        );

        let seen_queries = self.seen_queries.clone();
        let span = tracing::info_span!("seen.query", author = %message.author);
        tokio::spawn(async move { seen_queries.handle(&message).await }.instrument(span));
    }
}

/// A nick is ignored when the pattern finds a non-empty match in its
/// lowercased form. A pattern that can only match the empty string (such as
/// the default empty pattern) ignores nobody.
fn is_ignored(ignore: &Regex, author: &str) -> bool {
    let author = author.to_lowercase();
    ignore
        .find(&author)
        .is_some_and(|matched| !matched.as_str().is_empty())
}

/// First URL-like substring in the message text, if any.
pub fn extract_url(text: &str) -> Option<&str> {
    URL_PATTERN.find(text).map(|matched| matched.as_str())
}
