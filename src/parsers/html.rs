use crate::error::ClientError;
use scraper::{Html, Selector};
use url::Url;

/// Parse a CSS selector, mapping failures to [`ClientError::InvalidSelector`]
pub fn parse_selector(selector: &str) -> Result<Selector, ClientError> {
    Selector::parse(selector).map_err(|e| {
        ::log::debug!("Rejected selector {}: {}", selector, e);
        ClientError::InvalidSelector(selector.to_string())
    })
}

/// Returns true when at least one element in `html` matches `selector`
pub fn has_match(html: &str, selector: &str) -> Result<bool, ClientError> {
    let selector = parse_selector(selector)?;
    let doc = Html::parse_document(html);
    Ok(doc.select(&selector).next().is_some())
}

/// Extracts the `href` of every element matching `selector`, in document order.
///
/// Relative references are resolved against `page_url` the way a browser
/// resolves an anchor's `href` property. Elements without an `href` yield
/// an empty string so positions are preserved.
pub fn select_hrefs(html: &str, selector: &str, page_url: &str) -> Result<Vec<String>, ClientError> {
    let selector = parse_selector(selector)?;
    let doc = Html::parse_document(html);
    let base = Url::parse(page_url).ok();

    let hrefs = doc
        .select(&selector)
        .map(|e| match e.value().attr("href") {
            Some(href) => resolve(base.as_ref(), href.trim()),
            None => String::new(),
        })
        .collect::<Vec<String>>();

    ::log::debug!("HTML parser found {} matches in {}", hrefs.len(), page_url);
    Ok(hrefs)
}

fn resolve(base: Option<&Url>, href: &str) -> String {
    match base.map(|b| b.join(href)) {
        Some(Ok(resolved)) => resolved.to_string(),
        _ => href.to_string(),
    }
}
