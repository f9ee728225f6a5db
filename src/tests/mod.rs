
use crate::config::{ListingFailurePolicy, PageUrlGenerator, PipelineConfig};
use std::path::Path;

pub(crate) fn listing_url(page_index: i64) -> String {
    format!("https://catalog.test/page/{page_index}/")
}

/// Listing page with one `.show-more` anchor per detail URL
pub(crate) fn listing_html(detail_urls: &[&str]) -> String {
    let items = detail_urls
        .iter()
        .map(|url| format!(r#"<article><h2>Song</h2><a class="show-more" href="{url}">More</a></article>"#))
        .collect::<Vec<_>>()
        .join("\n");
    format!("<html><body><nav><a href=\"/\">Home</a></nav>{items}</body></html>")
}

/// Detail page exposing a single download anchor with the given class
pub(crate) fn detail_html(class: &str, href: &str) -> String {
    format!(r#"<html><body><h1>Song</h1><a class="{class}" href="{href}">Download</a></body></html>"#)
}

pub(crate) fn test_config(
    output_dir: &Path,
    minimum: i64,
    maximum: i64,
    policy: ListingFailurePolicy,
) -> PipelineConfig {
    PipelineConfig::builder(PageUrlGenerator::from_fn(listing_url))
        .with_page_range(minimum, maximum)
        .with_listing_failure_policy(policy)
        .with_output_path(output_dir.join("output.txt"))
        .build()
        .unwrap()
}
