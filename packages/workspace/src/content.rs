//! # Content placeholders
//!
//! Documents may carry `{{entries type="post" limit="3"}}` tokens standing
//! in for content the site manages elsewhere. A [`ContentResolver`] swaps
//! each token for markup from a [`ContentService`], caching per query, and
//! leaves a token in place when its query fails.
//!
//! Resolution is debounced against the live document: edits arriving
//! within the quiet period restart it, and only the latest version is
//! resolved.

use std::collections::HashMap;
use std::sync::{Arc, OnceLock};
use std::time::Duration;

use futures::future::BoxFuture;
use regex::{Captures, Regex};
use serde::{Deserialize, Serialize};
use tokio::sync::watch;
use tracing::{debug, warn};

use crate::error::ContentError;

pub const DEFAULT_LIMIT: usize = 3;

fn placeholder_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r#"\{\{\s*entries\s+type="([^"]+)"(?:\s+limit="(\d+)")?\s*\}\}"#)
            .expect("static regex")
    })
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentQuery {
    pub content_type: String,
    pub limit: usize,
}

impl ContentQuery {
    pub fn new(content_type: impl Into<String>, limit: usize) -> Self {
        Self {
            content_type: content_type.into(),
            limit,
        }
    }

    fn from_captures(captures: &Captures<'_>) -> Self {
        let limit = captures
            .get(2)
            .and_then(|m| m.as_str().parse().ok())
            .unwrap_or(DEFAULT_LIMIT);
        Self::new(&captures[1], limit)
    }
}

/// Every placeholder query in a document, in order, without duplicates
pub fn find_placeholders(document: &str) -> Vec<ContentQuery> {
    let mut queries: Vec<ContentQuery> = Vec::new();
    for captures in placeholder_re().captures_iter(document) {
        let query = ContentQuery::from_captures(&captures);
        if !queries.contains(&query) {
            queries.push(query);
        }
    }
    queries
}

/// Renders managed content as markup
pub trait ContentService: Send + Sync {
    fn render_entries(&self, query: &ContentQuery) -> BoxFuture<'static, Result<String, ContentError>>;
}

pub struct ContentResolver {
    service: Arc<dyn ContentService>,
    cache: HashMap<ContentQuery, String>,
    debounce: Duration,
}

impl std::fmt::Debug for ContentResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ContentResolver")
            .field("cached", &self.cache.len())
            .field("debounce", &self.debounce)
            .finish()
    }
}

impl ContentResolver {
    pub fn new(service: Arc<dyn ContentService>, debounce: Duration) -> Self {
        Self {
            service,
            cache: HashMap::new(),
            debounce,
        }
    }

    pub fn debounce(&self) -> Duration {
        self.debounce
    }

    pub fn cached(&self, query: &ContentQuery) -> Option<&str> {
        self.cache.get(query).map(String::as_str)
    }

    /// Forget cached results, e.g. after content was published
    pub fn invalidate(&mut self) {
        self.cache.clear();
    }

    /// Replace every placeholder in `document`
    pub async fn resolve(&mut self, document: &str) -> String {
        for query in find_placeholders(document) {
            if self.cache.contains_key(&query) {
                continue;
            }
            match self.service.render_entries(&query).await {
                Ok(markup) => {
                    debug!(content_type = %query.content_type, limit = query.limit, "content resolved");
                    self.cache.insert(query, markup);
                }
                Err(error) => {
                    warn!(content_type = %query.content_type, %error, "leaving content placeholder unresolved");
                }
            }
        }

        placeholder_re()
            .replace_all(document, |captures: &Captures<'_>| {
                let query = ContentQuery::from_captures(captures);
                match self.cache.get(&query) {
                    Some(markup) => markup.clone(),
                    None => captures[0].to_string(),
                }
            })
            .into_owned()
    }

    /// Wait for the document to change and settle, then resolve the latest
    /// version. Returns `None` once the sender is gone with nothing new.
    pub async fn resolve_debounced(&mut self, updates: &mut watch::Receiver<String>) -> Option<String> {
        updates.changed().await.ok()?;

        loop {
            match tokio::time::timeout(self.debounce, updates.changed()).await {
                // Another edit: restart the quiet period
                Ok(Ok(())) => continue,
                Ok(Err(_)) | Err(_) => break,
            }
        }

        let document = updates.borrow_and_update().clone();
        Some(self.resolve(&document).await)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Default)]
    struct Posts {
        calls: AtomicUsize,
    }

    impl ContentService for Posts {
        fn render_entries(&self, query: &ContentQuery) -> BoxFuture<'static, Result<String, ContentError>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let query = query.clone();
            Box::pin(async move {
                if query.content_type != "post" {
                    return Err(ContentError::UnknownType(query.content_type));
                }
                Ok((1..=query.limit).map(|i| format!("<article>Post {}</article>", i)).collect())
            })
        }
    }

    #[test]
    fn test_find_placeholders() {
        let queries = find_placeholders(
            r#"<main>{{entries type="post"}}<aside>{{ entries type="event" limit="5" }}</aside>{{entries type="post"}}</main>"#,
        );
        assert_eq!(
            queries,
            vec![ContentQuery::new("post", 3), ContentQuery::new("event", 5)]
        );
    }

    #[tokio::test]
    async fn test_resolve_caches_and_keeps_failures() {
        let service = Arc::new(Posts::default());
        let mut resolver = ContentResolver::new(service.clone(), Duration::from_millis(400));

        let document = r#"<main>{{entries type="post" limit="2"}}</main><aside>{{entries type="job"}}</aside>"#;
        let resolved = resolver.resolve(document).await;
        assert_eq!(
            resolved,
            r#"<main><article>Post 1</article><article>Post 2</article></main><aside>{{entries type="job"}}</aside>"#
        );

        resolver.resolve(document).await;
        // The failed query is retried, the cached one is not
        assert_eq!(service.calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_debounce_resolves_latest_only() {
        let service = Arc::new(Posts::default());
        let mut resolver = ContentResolver::new(service.clone(), Duration::from_millis(400));
        let (tx, mut rx) = watch::channel(String::new());

        let edits = async move {
            for limit in 1..=3 {
                tx.send(format!("{{{{entries type=\"post\" limit=\"{}\"}}}}", limit)).unwrap();
                tokio::time::sleep(Duration::from_millis(100)).await;
            }
            tokio::time::sleep(Duration::from_secs(5)).await;
            drop(tx);
        };
        let (resolved, ()) = tokio::join!(resolver.resolve_debounced(&mut rx), edits);

        assert_eq!(
            resolved.as_deref(),
            Some("<article>Post 1</article><article>Post 2</article><article>Post 3</article>")
        );
        assert_eq!(service.calls.load(Ordering::SeqCst), 1);
    }
}
