use crate::client::PageClient;
use crate::config::PipelineConfig;
use crate::error::ClientError;
use crate::results::{DetailOutcome, DetailRecord, ExtractionReport};

/// Extracts the download link from one detail page.
///
/// Never fails: errors become [`DetailOutcome::Failed`] and a page without a
/// usable link becomes [`DetailOutcome::NotAvailable`].
pub async fn extract_link<C>(client: &C, detail_url: &str, config: &PipelineConfig) -> DetailOutcome
where
    C: PageClient + ?Sized,
{
    match try_extract_link(client, detail_url, config).await {
        Ok(Some(link)) => DetailOutcome::Link(link),
        Ok(None) => DetailOutcome::NotAvailable,
        Err(e) => {
            ::log::warn!("No download link from {}: {}", detail_url, e);
            DetailOutcome::Failed(e.to_string())
        }
    }
}

/// Extracts every detail page in order, one navigation at a time
pub async fn extract_all<C>(
    client: &C,
    detail_urls: &[String],
    config: &PipelineConfig,
) -> ExtractionReport
where
    C: PageClient + ?Sized,
{
    let mut report = ExtractionReport {
        records: Vec::with_capacity(detail_urls.len()),
    };

    for detail_url in detail_urls {
        let outcome = extract_link(client, detail_url, config).await;
        ::log::debug!("{} -> {}", detail_url, outcome);
        report.records.push(DetailRecord {
            detail_url: detail_url.clone(),
            outcome,
        });
    }

    let links = report.links();
    ::log::info!("{}", links.join("\n"));
    ::log::info!(
        "Resolved {} of {} detail pages ({} without a link, {} failed)",
        links.len(),
        detail_urls.len(),
        report.not_available_count(),
        report.failed_count()
    );

    report
}

async fn try_extract_link<C>(
    client: &C,
    detail_url: &str,
    config: &PipelineConfig,
) -> Result<Option<String>, ClientError>
where
    C: PageClient + ?Sized,
{
    ::log::info!("going to {}", detail_url);
    client.navigate(detail_url, config.detail_timeout).await?;
    client
        .wait_for(&config.combined_detail_selector(), config.detail_timeout)
        .await?;

    // First real link of the most preferred variant present on the page
    for selector in &config.detail_selectors {
        let hrefs = client.query_hrefs(selector).await?;
        if let Some(link) = hrefs.into_iter().find(|href| !href.is_empty()) {
            return Ok(Some(link));
        }
    }
    Ok(None)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PageUrlGenerator;
    use crate::crawlers::FixturePageClient;

    fn config() -> PipelineConfig {
        PipelineConfig::builder(PageUrlGenerator::from_fn(|i| format!("https://site.test/page/{i}")))
            .build()
            .unwrap()
    }

    #[tokio::test]
    async fn test_prefers_high_quality_variant() {
        let client = FixturePageClient::new().with_page(
            "https://site.test/song/a",
            r#"<a class="dl-128" href="/a-128.mp3">128</a><a class="dl-320" href="/a-320.mp3">320</a>"#,
        );
        let outcome = extract_link(&client, "https://site.test/song/a", &config()).await;
        assert_eq!(outcome, DetailOutcome::Link("https://site.test/a-320.mp3".into()));
    }

    #[tokio::test]
    async fn test_falls_back_to_lower_quality() {
        let client = FixturePageClient::new().with_page(
            "https://site.test/song/a",
            r#"<a class="dl-128" href="https://cdn.test/a.mp3">128</a><a class="dl-128" href="https://cdn.test/other.mp3">x</a>"#,
        );
        let outcome = extract_link(&client, "https://site.test/song/a", &config()).await;
        assert_eq!(outcome, DetailOutcome::Link("https://cdn.test/a.mp3".into()));
    }

    #[tokio::test]
    async fn test_placeholder_variant_falls_through_to_real_link() {
        let client = FixturePageClient::new().with_page(
            "https://site.test/song/a",
            r#"<span class="dl-320">320 soon</span><a class="dl-128" href="/a-128.mp3">128</a>"#,
        );
        let outcome = extract_link(&client, "https://site.test/song/a", &config()).await;
        assert_eq!(outcome, DetailOutcome::Link("https://site.test/a-128.mp3".into()));
    }

    #[tokio::test]
    async fn test_hanging_detail_page_fails_within_timeout() {
        let config =
            PipelineConfig::builder(PageUrlGenerator::from_fn(|i| format!("https://site.test/page/{i}")))
                .with_detail_timeout(std::time::Duration::from_millis(20))
                .build()
                .unwrap();
        let client = FixturePageClient::new()
            .with_hanging_page("https://site.test/song/a")
            .with_page(
                "https://site.test/song/b",
                r#"<a class="dl-320" href="/b.mp3">b</a>"#,
            );
        let urls = vec![
            "https://site.test/song/a".to_string(),
            "https://site.test/song/b".to_string(),
        ];

        let report = extract_all(&client, &urls, &config).await;
        assert!(report.records[0].outcome.is_failure());
        assert_eq!(report.links(), vec!["https://site.test/b.mp3"]);
    }

    #[tokio::test]
    async fn test_missing_element_is_a_failure() {
        let client =
            FixturePageClient::new().with_page("https://site.test/song/a", "<p>removed</p>");
        let outcome = extract_link(&client, "https://site.test/song/a", &config()).await;
        assert!(outcome.is_failure());
    }

    #[tokio::test]
    async fn test_element_without_href_is_not_available() {
        let client = FixturePageClient::new().with_page(
            "https://site.test/song/a",
            r#"<span class="dl-320">soon</span>"#,
        );
        let outcome = extract_link(&client, "https://site.test/song/a", &config()).await;
        assert_eq!(outcome, DetailOutcome::NotAvailable);
    }

    #[tokio::test]
    async fn test_unreachable_page_is_a_failure() {
        let client = FixturePageClient::new().with_broken_page("https://site.test/song/a");
        let outcome = extract_link(&client, "https://site.test/song/a", &config()).await;
        assert!(matches!(outcome, DetailOutcome::Failed(reason) if reason.contains("unreachable")));
    }

    #[tokio::test]
    async fn test_extract_all_keeps_one_record_per_url_in_order() {
        let client = FixturePageClient::new()
            .with_page(
                "https://site.test/song/a",
                r#"<a class="dl-320" href="/a.mp3">a</a>"#,
            )
            .with_broken_page("https://site.test/song/b")
            .with_page(
                "https://site.test/song/c",
                r#"<a class="dl-128" href="/c.mp3">c</a>"#,
            );
        let urls = vec![
            "https://site.test/song/a".to_string(),
            "https://site.test/song/b".to_string(),
            "https://site.test/song/c".to_string(),
        ];

        let report = extract_all(&client, &urls, &config()).await;
        assert_eq!(report.records.len(), 3);
        assert_eq!(
            report
                .records
                .iter()
                .map(|r| r.detail_url.as_str())
                .collect::<Vec<_>>(),
            urls
        );
        assert_eq!(
            report.links(),
            vec!["https://site.test/a.mp3", "https://site.test/c.mp3"]
        );
        assert_eq!(client.history(), urls);
    }
}
