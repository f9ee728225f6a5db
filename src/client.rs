use crate::error::ClientError;
use async_trait::async_trait;
use std::future::Future;
use std::time::Duration;

/// Browser capability the pipeline stages drive.
///
/// One client is one navigable tab. Stages call it strictly sequentially;
/// implementations never see two operations in flight at once.
#[async_trait]
pub trait PageClient: Send + Sync {
    /// Load `url`, returning once the initial document has been parsed or
    /// failing once `timeout` has passed
    async fn navigate(&self, url: &str, timeout: Duration) -> Result<(), ClientError>;

    /// Block until at least one element matches `selector`, or fail after `timeout`
    async fn wait_for(&self, selector: &str, timeout: Duration) -> Result<(), ClientError>;

    /// Absolute `href` of every element matching `selector`, in document order
    async fn query_hrefs(&self, selector: &str) -> Result<Vec<String>, ClientError>;
}

/// A [`PageClient`] owning a browser resource that must be released once
#[async_trait]
pub trait BrowserSession: PageClient + Sized {
    async fn close(self) -> Result<(), ClientError>;
}

/// Bounds a navigation future by `timeout`
pub async fn navigate_within<F>(url: &str, timeout: Duration, navigation: F) -> Result<(), ClientError>
where
    F: Future<Output = Result<(), ClientError>>,
{
    match tokio::time::timeout(timeout, navigation).await {
        Ok(result) => result,
        Err(_) => Err(ClientError::NavigationTimeout {
            url: url.to_string(),
            timeout,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_navigate_within_passes_through_result() {
        let result = navigate_within("https://site.test/", Duration::from_secs(1), async { Ok(()) }).await;
        assert_eq!(result, Ok(()));
    }

    #[tokio::test]
    async fn test_navigate_within_times_out() {
        let result = navigate_within(
            "https://site.test/slow",
            Duration::from_millis(10),
            std::future::pending(),
        )
        .await;
        assert_eq!(
            result,
            Err(ClientError::NavigationTimeout {
                url: "https://site.test/slow".to_string(),
                timeout: Duration::from_millis(10),
            })
        );
    }
}
