//! URL title announcements with a 24-hour freshness cache.

pub mod store;
pub mod types;

pub use store::UrlStore;
pub use types::UrlRecord;

use crate::titles::FetchTitle;
use crate::OutboundMessage;

use chrono::Utc;
use tokio::sync::mpsc::UnboundedSender;

/// Cached titles older than this are refetched.
pub const FRESHNESS_WINDOW_SECS: i64 = 86_400;

/// Owns the URL cache: decides between serving a cached title and fetching a
/// fresh one, and writes results back.
pub struct UrlManager<F> {
    store: UrlStore,
    fetcher: F,
    outbound: UnboundedSender<OutboundMessage>,
    room: String,
}

impl<F: FetchTitle> UrlManager<F> {
    pub fn new(
        store: UrlStore,
        fetcher: F,
        outbound: UnboundedSender<OutboundMessage>,
        room: impl Into<String>,
    ) -> Self {
        Self {
            store,
            fetcher,
            outbound,
            room: room.into(),
        }
    }

    /// Announce a title for a URL posted by `author`.
    ///
    /// A fresh cache hit is answered without network I/O. A stale or missing
    /// record triggers exactly one fetch, then a write-back (update in place
    /// when a record existed, insert otherwise). Two near-simultaneous
    /// postings of the same URL may both fetch and both write; last writer
    /// wins. Store failures are logged and never reach the channel.
    pub async fn handle_url(&self, url: &str, author: &str) {
        let existing = match self.store.get(url).await {
            Ok(existing) => existing,
            Err(error) => {
                tracing::error!(%error, url, "url cache lookup failed");
                None
            }
        };

        if let Some(record) = &existing {
            let age_secs = Utc::now()
                .signed_duration_since(record.posted_at)
                .num_seconds();
            if age_secs < FRESHNESS_WINDOW_SECS {
                tracing::debug!(url, age_secs, "serving title from cache");
                self.announce(format!(
                    "{}. Originally posted by: {}",
                    record.title, record.who
                ));
                return;
            }
        }

        // Fetch failures stay silent: no announcement, no write.
        let Some(title) = self.fetcher.fetch_title(url).await else {
            return;
        };
        tracing::debug!(url, title = %title, "fetched title");
        self.announce(title.clone());

        let result = match existing {
            Some(mut record) => {
                record.title = title;
                record.who = author.to_owned();
                record.posted_at = Utc::now();
                self.store.update(&record).await
            }
            None => self.store.insert(&UrlRecord::new(url, title, author)).await,
        };
        if let Err(error) = result {
            tracing::error!(%error, url, "failed to persist url record");
        }
    }

    fn announce(&self, text: String) {
        self.outbound
            .send(OutboundMessage {
                target: self.room.clone(),
                text,
            })
            .ok();
    }
}
