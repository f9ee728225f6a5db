use crate::client::{self, BrowserSession, PageClient};
use crate::error::ClientError;
use crate::parsers::html;
use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

/// In-memory [`PageClient`] serving HTML snapshots keyed by URL.
///
/// Waits resolve immediately: a selector either matches the loaded snapshot
/// or the wait reports a timeout. URLs without a snapshot, or registered
/// with [`with_broken_page`](Self::with_broken_page), fail to navigate.
/// Pages registered with [`with_hanging_page`](Self::with_hanging_page)
/// never finish loading and hit the navigation timeout.
#[derive(Debug, Default)]
pub struct FixturePageClient {
    pages: HashMap<String, String>,
    broken: HashSet<String>,
    hanging: HashSet<String>,
    closes: Arc<AtomicUsize>,
    current: Mutex<Option<String>>,
    history: Mutex<Vec<String>>,
}

impl FixturePageClient {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the HTML served for `url`
    pub fn with_page(mut self, url: impl Into<String>, html: impl Into<String>) -> Self {
        self.pages.insert(url.into(), html.into());
        self
    }

    /// Make navigation to `url` fail
    pub fn with_broken_page(mut self, url: impl Into<String>) -> Self {
        self.broken.insert(url.into());
        self
    }

    /// Make navigation to `url` never complete
    pub fn with_hanging_page(mut self, url: impl Into<String>) -> Self {
        self.hanging.insert(url.into());
        self
    }

    /// Shared counter of [`BrowserSession::close`] calls, readable after the
    /// client has been consumed
    pub fn close_counter(&self) -> Arc<AtomicUsize> {
        Arc::clone(&self.closes)
    }

    /// Every URL navigated to so far, in order
    pub fn history(&self) -> Vec<String> {
        lock(&self.history).clone()
    }

    fn current_page(&self) -> Result<(String, &str), ClientError> {
        let current = lock(&self.current).clone();
        let url = current.ok_or_else(|| ClientError::Command("no page loaded".to_string()))?;
        let html = self
            .pages
            .get(&url)
            .map(String::as_str)
            .ok_or_else(|| ClientError::Command(format!("no snapshot for {url}")))?;
        Ok((url, html))
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

#[async_trait]
impl PageClient for FixturePageClient {
    async fn navigate(&self, url: &str, timeout: Duration) -> Result<(), ClientError> {
        lock(&self.history).push(url.to_string());

        if self.hanging.contains(url) {
            *lock(&self.current) = None;
            return client::navigate_within(url, timeout, std::future::pending()).await;
        }

        if self.broken.contains(url) || !self.pages.contains_key(url) {
            *lock(&self.current) = None;
            return Err(ClientError::Navigation {
                url: url.to_string(),
                reason: "page unreachable".to_string(),
            });
        }

        *lock(&self.current) = Some(url.to_string());
        Ok(())
    }

    async fn wait_for(&self, selector: &str, timeout: Duration) -> Result<(), ClientError> {
        let (_, html) = self.current_page()?;
        if html::has_match(html, selector)? {
            Ok(())
        } else {
            Err(ClientError::Timeout {
                selector: selector.to_string(),
                timeout,
            })
        }
    }

    async fn query_hrefs(&self, selector: &str) -> Result<Vec<String>, ClientError> {
        let (url, html) = self.current_page()?;
        html::select_hrefs(html, selector, &url)
    }
}

#[async_trait]
impl BrowserSession for FixturePageClient {
    async fn close(self) -> Result<(), ClientError> {
        self.closes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SHORT: Duration = Duration::from_millis(20);

    #[tokio::test]
    async fn test_navigate_and_query() {
        let client = FixturePageClient::new().with_page(
            "https://site.test/song/a",
            r#"<a class="dl-128" href="/a.mp3">dl</a>"#,
        );

        client.navigate("https://site.test/song/a", SHORT).await.unwrap();
        client
            .wait_for(".dl-128", Duration::from_millis(10))
            .await
            .unwrap();
        let hrefs = client.query_hrefs(".dl-128").await.unwrap();
        assert_eq!(hrefs, vec!["https://site.test/a.mp3"]);
    }

    #[tokio::test]
    async fn test_wait_times_out_without_match() {
        let client = FixturePageClient::new().with_page("https://site.test/", "<p>empty</p>");
        client.navigate("https://site.test/", SHORT).await.unwrap();

        let err = client
            .wait_for(".show-more", Duration::from_millis(5))
            .await
            .unwrap_err();
        assert!(matches!(err, ClientError::Timeout { .. }));
    }

    #[tokio::test]
    async fn test_broken_and_unknown_pages_fail() {
        let client = FixturePageClient::new()
            .with_page("https://site.test/ok", "<p>ok</p>")
            .with_broken_page("https://site.test/ok");

        assert!(client.navigate("https://site.test/ok", SHORT).await.is_err());
        assert!(client.navigate("https://site.test/missing", SHORT).await.is_err());
        assert_eq!(
            client.history(),
            vec!["https://site.test/ok", "https://site.test/missing"]
        );

        let err = client.query_hrefs("a").await.unwrap_err();
        assert!(matches!(err, ClientError::Command(_)));
    }

    #[tokio::test]
    async fn test_hanging_page_hits_navigation_timeout() {
        let client = FixturePageClient::new().with_hanging_page("https://site.test/slow");

        let err = client.navigate("https://site.test/slow", SHORT).await.unwrap_err();
        assert_eq!(
            err,
            ClientError::NavigationTimeout {
                url: "https://site.test/slow".to_string(),
                timeout: SHORT,
            }
        );
    }

    #[tokio::test]
    async fn test_close_is_counted() {
        let client = FixturePageClient::new();
        let closes = client.close_counter();

        client.close().await.unwrap();
        assert_eq!(closes.load(Ordering::SeqCst), 1);
    }
}
