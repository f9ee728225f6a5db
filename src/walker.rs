use crate::client::PageClient;
use crate::config::{ListingFailurePolicy, PipelineConfig};
use crate::error::{ClientError, PipelineError};
use crate::results::{ListingWalk, SkippedListing};

/// Visits every listing page in ascending index order and collects the
/// detail URLs each one links to.
///
/// A listing page that fails to load or never shows the listing marker is
/// skipped or aborts the walk, depending on the configured
/// [`ListingFailurePolicy`].
pub async fn collect_detail_urls<C>(
    client: &C,
    config: &PipelineConfig,
) -> Result<ListingWalk, PipelineError>
where
    C: PageClient + ?Sized,
{
    let mut walk = ListingWalk::default();

    for page_index in config.page_range() {
        let listing_url = config.page_url_generator.generate(page_index);

        match extract_listing(client, &listing_url, config).await {
            Ok(urls) => {
                ::log::info!("Found {} detail links in {}", urls.len(), listing_url);
                walk.detail_urls.extend(urls);
                walk.pages_visited += 1;
            }
            Err(source) => match config.listing_failure_policy {
                ListingFailurePolicy::FailFast => {
                    ::log::error!("Listing page {} failed: {}", listing_url, source);
                    return Err(PipelineError::Listing {
                        page_index,
                        url: listing_url,
                        source,
                    });
                }
                ListingFailurePolicy::Skip => {
                    ::log::warn!("Skipping listing page {}: {}", listing_url, source);
                    walk.skipped_pages.push(SkippedListing {
                        page_index,
                        url: listing_url,
                        reason: source.to_string(),
                    });
                }
            },
        }
    }

    Ok(walk)
}

/// Loads one listing page and returns its detail URLs in document order
async fn extract_listing<C>(
    client: &C,
    listing_url: &str,
    config: &PipelineConfig,
) -> Result<Vec<String>, ClientError>
where
    C: PageClient + ?Sized,
{
    ::log::info!("going to {}", listing_url);
    client.navigate(listing_url, config.listing_timeout).await?;
    client
        .wait_for(&config.listing_selector, config.listing_timeout)
        .await?;

    let hrefs = client.query_hrefs(&config.listing_selector).await?;
    let total = hrefs.len();
    let urls: Vec<String> = hrefs.into_iter().filter(|href| !href.is_empty()).collect();
    if urls.len() < total {
        ::log::debug!(
            "Ignored {} listing markers without an href on {}",
            total - urls.len(),
            listing_url
        );
    }
    Ok(urls)
}
