//! Per-user activity tracking and `#seen` queries.

pub mod store;
pub mod types;

pub use store::SeenStore;
pub use types::SeenRecord;

use crate::{InboundMessage, OutboundMessage};

use chrono::Utc;
use tokio::sync::mpsc::UnboundedSender;

/// Query prefix token, matched case-insensitively.
const SEEN_TOKEN: &str = "#seen";

/// Upserts a seen record for every observed message.
pub struct SeenTracker {
    store: SeenStore,
}

impl SeenTracker {
    pub fn new(store: SeenStore) -> Self {
        Self { store }
    }

    /// Record that `author` was just active. One store read and one store
    /// write per message; record count is bounded by distinct nicks, not
    /// message volume.
    pub async fn observe(&self, author: &str, text: &str) {
        let existing = match self.store.get(author).await {
            Ok(existing) => existing,
            Err(error) => {
                tracing::error!(%error, author, "seen lookup failed");
                return;
            }
        };

        let result = match existing {
            Some(mut record) => {
                record.last_seen_at = Utc::now();
                record.last_message = text.to_owned();
                self.store.update(&record).await
            }
            None => self.store.insert(&SeenRecord::new(author, text)).await,
        };
        if let Err(error) = result {
            tracing::error!(%error, author, "failed to persist seen record");
        }
    }
}

/// Answers `#seen <nick>...` queries.
pub struct SeenQueryHandler {
    store: SeenStore,
    outbound: UnboundedSender<OutboundMessage>,
    room: String,
}

impl SeenQueryHandler {
    pub fn new(
        store: SeenStore,
        outbound: UnboundedSender<OutboundMessage>,
        room: impl Into<String>,
    ) -> Self {
        Self {
            store,
            outbound,
            room: room.into(),
        }
    }

    /// Answer a `#seen` query with one reply per queried nick, in query
    /// order. Non-query messages are a no-op.
    pub async fn handle(&self, message: &InboundMessage) {
        let Some(nicks) = parse_query(&message.text) else {
            return;
        };

        for nick in nicks {
            let reply = match self.store.get(nick).await {
                Ok(Some(record)) => {
                    let age_secs = Utc::now()
                        .signed_duration_since(record.last_seen_at)
                        .num_seconds()
                        .max(0);
                    format!(
                        "{}: {} was last seen {} ago.",
                        message.author,
                        record.who,
                        format_age(age_secs)
                    )
                }
                Ok(None) => format!(
                    "{}: Sorry, I have never seen {} before",
                    message.author, nick
                ),
                Err(error) => {
                    tracing::error!(%error, nick, "seen query lookup failed");
                    continue;
                }
            };

            self.outbound
                .send(OutboundMessage {
                    target: self.room.clone(),
                    text: reply,
                })
                .ok();
        }
    }
}

/// The queried nicks, in order, when the text is a `#seen` query.
fn parse_query(text: &str) -> Option<Vec<&str>> {
    let mut tokens = text.split_whitespace();
    if !tokens.next()?.eq_ignore_ascii_case(SEEN_TOKEN) {
        return None;
    }
    Some(tokens.collect())
}

fn format_age(secs: i64) -> String {
    if secs < 60 {
        format!("{secs}s")
    } else if secs < 3_600 {
        format!("{}m", secs / 60)
    } else if secs < 86_400 {
        format!("{}h", secs / 3_600)
    } else {
        format!("{}d", secs / 86_400)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sqlx::SqlitePool;
    use tokio::sync::mpsc::{self, UnboundedReceiver};

    async fn test_pool() -> SqlitePool {
        let pool = SqlitePool::connect("sqlite::memory:")
            .await
            .expect("in-memory sqlite should connect");
        sqlx::query(
            "CREATE TABLE seen (
                who TEXT PRIMARY KEY,
                last_seen_at TIMESTAMP NOT NULL,
                last_message TEXT NOT NULL
            )",
        )
        .execute(&pool)
        .await
        .expect("seen schema should create");
        pool
    }

    fn query_handler(
        pool: &SqlitePool,
    ) -> (SeenQueryHandler, UnboundedReceiver<crate::OutboundMessage>) {
        let (outbound_tx, outbound_rx) = mpsc::unbounded_channel();
        let handler = SeenQueryHandler::new(SeenStore::new(pool.clone()), outbound_tx, "#room");
        (handler, outbound_rx)
    }

    fn query_from(author: &str, text: &str) -> InboundMessage {
        InboundMessage {
            author: author.into(),
            text: text.into(),
            channel: "#room".into(),
        }
    }

    #[test]
    fn parse_query_is_case_insensitive_and_ordered() {
        assert_eq!(parse_query("#seen bob"), Some(vec!["bob"]));
        assert_eq!(parse_query("#SEEN bob carl"), Some(vec!["bob", "carl"]));
        assert_eq!(parse_query("#seen"), Some(vec![]));
        assert_eq!(parse_query("have you #seen bob"), None);
        assert_eq!(parse_query("hello world"), None);
        assert_eq!(parse_query(""), None);
    }

    #[test]
    fn format_age_ladder() {
        assert_eq!(format_age(0), "0s");
        assert_eq!(format_age(42), "42s");
        assert_eq!(format_age(90), "1m");
        assert_eq!(format_age(7_200), "2h");
        assert_eq!(format_age(200_000), "2d");
    }

    #[tokio::test]
    async fn observe_twice_leaves_one_record_with_latest_message() {
        let pool = test_pool().await;
        let tracker = SeenTracker::new(SeenStore::new(pool.clone()));

        tracker.observe("alice", "first message").await;
        tracker.observe("alice", "second message").await;

        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM seen")
            .fetch_one(&pool)
            .await
            .expect("count should succeed");
        assert_eq!(count, 1, "repeat activity must not duplicate the record");

        let record = SeenStore::new(pool)
            .get("alice")
            .await
            .expect("lookup should succeed")
            .expect("record should exist");
        assert_eq!(record.last_message, "second message");
    }

    #[tokio::test]
    async fn unknown_nick_gets_never_seen_reply() {
        let pool = test_pool().await;
        let (handler, mut outbound) = query_handler(&pool);

        handler.handle(&query_from("alice", "#seen bob")).await;

        let reply = outbound.try_recv().expect("query should produce a reply");
        assert_eq!(reply.text, "alice: Sorry, I have never seen bob before");
        assert_eq!(reply.target, "#room");
    }

    #[tokio::test]
    async fn known_nick_gets_last_seen_reply() {
        let pool = test_pool().await;
        let tracker = SeenTracker::new(SeenStore::new(pool.clone()));
        tracker.observe("bob", "o/").await;

        let (handler, mut outbound) = query_handler(&pool);
        handler.handle(&query_from("alice", "#seen bob")).await;

        let reply = outbound.try_recv().expect("query should produce a reply");
        assert!(
            reply.text.starts_with("alice: bob was last seen "),
            "unexpected reply: {}",
            reply.text
        );
        assert!(reply.text.ends_with(" ago."), "unexpected reply: {}", reply.text);
    }

    #[tokio::test]
    async fn multiple_nicks_reply_in_query_order() {
        let pool = test_pool().await;
        let tracker = SeenTracker::new(SeenStore::new(pool.clone()));
        tracker.observe("carl", "around").await;

        let (handler, mut outbound) = query_handler(&pool);
        handler.handle(&query_from("alice", "#seen bob carl")).await;

        let first = outbound.try_recv().expect("first reply should arrive");
        assert!(first.text.contains("never seen bob"), "unexpected reply: {}", first.text);
        let second = outbound.try_recv().expect("second reply should arrive");
        assert!(second.text.contains("carl was last seen"), "unexpected reply: {}", second.text);
    }

    #[tokio::test]
    async fn non_query_message_is_ignored() {
        let pool = test_pool().await;
        let (handler, mut outbound) = query_handler(&pool);

        handler.handle(&query_from("alice", "just chatting")).await;

        assert!(outbound.try_recv().is_err());
    }
}
