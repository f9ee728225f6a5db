use std::fmt;
use std::path::PathBuf;

/// Rendered form of [`DetailOutcome::NotAvailable`]
pub const NOT_AVAILABLE: &str = "<N/A>";

/// Result of extracting the download link from one detail page
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DetailOutcome {
    /// The page exposed a download link
    Link(String),
    /// The page loaded but had no usable link element
    NotAvailable,
    /// Navigation, waiting or querying failed
    Failed(String),
}

impl DetailOutcome {
    /// The link, if this outcome contributes to the output
    pub fn link(&self) -> Option<&str> {
        match self {
            DetailOutcome::Link(link) if !link.is_empty() && link != NOT_AVAILABLE => {
                Some(link)
            }
            _ => None,
        }
    }

    pub fn is_failure(&self) -> bool {
        matches!(self, DetailOutcome::Failed(_))
    }
}

impl fmt::Display for DetailOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DetailOutcome::Link(link) => f.write_str(link),
            DetailOutcome::NotAvailable => f.write_str(NOT_AVAILABLE),
            DetailOutcome::Failed(reason) => write!(f, "failed: {reason}"),
        }
    }
}

/// One detail page and what extraction produced for it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DetailRecord {
    pub detail_url: String,
    pub outcome: DetailOutcome,
}

/// A listing page the walker gave up on
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedListing {
    pub page_index: i64,
    pub url: String,
    pub reason: String,
}

/// Output of the listing walker
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListingWalk {
    /// Detail URLs in listing order, then document order; duplicates kept
    pub detail_urls: Vec<String>,
    pub pages_visited: usize,
    pub skipped_pages: Vec<SkippedListing>,
}

/// Output of the detail extractor, one record per input URL
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExtractionReport {
    pub records: Vec<DetailRecord>,
}

impl ExtractionReport {
    /// Resolved links in input order, sentinel and empty values excluded
    pub fn links(&self) -> Vec<String> {
        self.records
            .iter()
            .filter_map(|record| record.outcome.link())
            .map(str::to_string)
            .collect()
    }

    pub fn failed_count(&self) -> usize {
        self.records.iter().filter(|r| r.outcome.is_failure()).count()
    }

    pub fn not_available_count(&self) -> usize {
        self.records
            .iter()
            .filter(|r| r.outcome == DetailOutcome::NotAvailable)
            .count()
    }
}

/// Final ordered list of links written to the output artifact
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OutputRecordSet {
    links: Vec<String>,
}

impl OutputRecordSet {
    /// Build from raw values, dropping empty strings and the sentinel
    pub fn new(links: Vec<String>) -> Self {
        let links = links
            .into_iter()
            .filter(|link| !link.is_empty() && link != NOT_AVAILABLE)
            .collect();
        Self { links }
    }

    pub fn links(&self) -> &[String] {
        &self.links
    }

    pub fn len(&self) -> usize {
        self.links.len()
    }

    pub fn is_empty(&self) -> bool {
        self.links.is_empty()
    }

    /// Newline-joined text with no trailing separator
    pub fn to_text(&self) -> String {
        self.links.join("\n")
    }
}

impl From<&ExtractionReport> for OutputRecordSet {
    fn from(report: &ExtractionReport) -> Self {
        Self::new(report.links())
    }
}

/// Everything one completed run produced
#[derive(Debug, Clone)]
pub struct RunSummary {
    pub listing: ListingWalk,
    pub extraction: ExtractionReport,
    pub output: OutputRecordSet,
    pub output_path: PathBuf,
}
