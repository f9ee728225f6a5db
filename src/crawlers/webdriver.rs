use crate::client::{self, BrowserSession, PageClient};
use crate::config::PipelineConfig;
use crate::error::{ClientError, PipelineError};
use async_trait::async_trait;
use fantoccini::error::CmdError;
use fantoccini::wd::TimeoutConfiguration;
use fantoccini::{Client, ClientBuilder, Locator};
use serde_json::{Map, Value, json};
use std::sync::{Mutex, PoisonError};
use std::time::Duration;

/// Script timeout sent alongside page-load updates; matches the W3C default
const SCRIPT_TIMEOUT: Duration = Duration::from_secs(30);

/// A single browser tab driven through a WebDriver server.
///
/// Created once per run by [`WebDriverSession::open`] and released with
/// [`BrowserSession::close`].
pub struct WebDriverSession {
    client: Client,
    webdriver_url: String,
    /// Page-load timeout last sent to the driver
    page_load_timeout: Mutex<Option<Duration>>,
}

impl WebDriverSession {
    /// Connects to the configured WebDriver server and opens one session
    /// with the configured viewport and user agent.
    pub async fn open(config: &PipelineConfig) -> Result<Self, PipelineError> {
        ::log::info!("Connecting to WebDriver at {}", config.webdriver_url);

        let mut builder = ClientBuilder::native();
        builder.capabilities(build_capabilities(config));
        let client = builder
            .connect(&config.webdriver_url)
            .await
            .map_err(|source| {
                ::log::error!(
                    "Make sure a WebDriver server is running at {} or set WEBDRIVER_URL",
                    config.webdriver_url
                );
                PipelineError::Session {
                    webdriver_url: config.webdriver_url.clone(),
                    source,
                }
            })?;

        // Capabilities already carry the window size; this covers drivers that ignore them
        if let Err(e) = client
            .set_window_size(config.viewport_width, config.viewport_height)
            .await
        {
            ::log::warn!("Failed to set window size: {}", e);
        }

        ::log::debug!(
            "Session ready ({}x{}, headless: {})",
            config.viewport_width,
            config.viewport_height,
            config.headless
        );

        Ok(Self {
            client,
            webdriver_url: config.webdriver_url.clone(),
            page_load_timeout: Mutex::new(Some(config.listing_timeout)),
        })
    }

    /// Keeps the driver's own page-load timeout in line with the current
    /// navigation class so an abandoned load does not block later commands
    async fn apply_page_load_timeout(&self, timeout: Duration) {
        let current = *self
            .page_load_timeout
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        if current == Some(timeout) {
            return;
        }

        let timeouts = TimeoutConfiguration::new(Some(SCRIPT_TIMEOUT), Some(timeout), None);
        match self.client.update_timeouts(timeouts).await {
            Ok(()) => {
                *self
                    .page_load_timeout
                    .lock()
                    .unwrap_or_else(PoisonError::into_inner) = Some(timeout);
            }
            Err(e) => ::log::warn!("Failed to set page load timeout: {}", e),
        }
    }
}

#[async_trait]
impl BrowserSession for WebDriverSession {
    async fn close(self) -> Result<(), ClientError> {
        ::log::debug!("Closing WebDriver session at {}", self.webdriver_url);
        self.client
            .close()
            .await
            .map_err(|e| ClientError::Command(e.to_string()))
    }
}

/// Session capabilities for the configured viewport, user agent and headless mode.
///
/// Both Chrome and Firefox options are sent; each driver ignores the other
/// vendor's block. `eager` page loading returns from navigation once the
/// document has been parsed.
pub fn build_capabilities(config: &PipelineConfig) -> Map<String, Value> {
    let mut chrome_args = vec![
        format!(
            "--window-size={},{}",
            config.viewport_width, config.viewport_height
        ),
        format!("--user-agent={}", config.user_agent),
    ];
    let mut firefox_args = vec![
        format!("--width={}", config.viewport_width),
        format!("--height={}", config.viewport_height),
    ];
    if config.headless {
        chrome_args.push("--headless=new".to_string());
        firefox_args.push("-headless".to_string());
    }

    let mut caps = Map::new();
    caps.insert("pageLoadStrategy".to_string(), json!("eager"));
    caps.insert(
        "timeouts".to_string(),
        json!({ "pageLoad": duration_millis(config.listing_timeout) }),
    );
    caps.insert("goog:chromeOptions".to_string(), json!({ "args": chrome_args }));
    caps.insert(
        "moz:firefoxOptions".to_string(),
        json!({
            "args": firefox_args,
            "prefs": { "general.useragent.override": config.user_agent },
        }),
    );
    caps
}

#[async_trait]
impl PageClient for WebDriverSession {
    async fn navigate(&self, url: &str, timeout: Duration) -> Result<(), ClientError> {
        self.apply_page_load_timeout(timeout).await;

        let navigation = async {
            self.client
                .goto(url)
                .await
                .map_err(|e| handle_navigation_error(e, url))
        };
        client::navigate_within(url, timeout, navigation).await
    }

    async fn wait_for(&self, selector: &str, timeout: Duration) -> Result<(), ClientError> {
        match self
            .client
            .wait()
            .at_most(timeout)
            .for_element(Locator::Css(selector))
            .await
        {
            Ok(_) => Ok(()),
            Err(CmdError::WaitTimeout) => Err(ClientError::Timeout {
                selector: selector.to_string(),
                timeout,
            }),
            Err(e) => Err(ClientError::Command(e.to_string())),
        }
    }

    async fn query_hrefs(&self, selector: &str) -> Result<Vec<String>, ClientError> {
        let elements = self
            .client
            .find_all(Locator::Css(selector))
            .await
            .map_err(|e| ClientError::Command(e.to_string()))?;

        let mut hrefs = Vec::with_capacity(elements.len());
        for element in elements {
            // The property, unlike the attribute, is already resolved to an absolute URL
            let href = element
                .prop("href")
                .await
                .map_err(|e| ClientError::Command(e.to_string()))?;
            hrefs.push(href.unwrap_or_default());
        }
        Ok(hrefs)
    }
}

fn duration_millis(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}

/// Maps a failed navigation to a [`ClientError`], flagging lost sessions
fn handle_navigation_error(error: CmdError, url: &str) -> ClientError {
    let reason = error.to_string();
    if reason.contains("Unable to find session") {
        ::log::warn!("Lost WebDriver session while accessing {}", url);
    } else {
        ::log::debug!("Failed to access {}: {}", url, reason);
    }
    ClientError::Navigation {
        url: url.to_string(),
        reason,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PageUrlGenerator;

    fn config(headless: bool) -> PipelineConfig {
        PipelineConfig::builder(PageUrlGenerator::from_fn(|i| format!("https://site.test/{i}")))
            .with_viewport(1280, 720)
            .with_user_agent("TestAgent/1.0")
            .with_headless(headless)
            .with_listing_timeout(Duration::from_secs(45))
            .build()
            .unwrap()
    }

    #[test]
    fn test_capabilities_carry_viewport_and_user_agent() {
        let caps = build_capabilities(&config(true));
        assert_eq!(caps["pageLoadStrategy"], json!("eager"));
        assert_eq!(caps["timeouts"]["pageLoad"], json!(45_000));

        let chrome_args = caps["goog:chromeOptions"]["args"].as_array().unwrap();
        assert!(chrome_args.contains(&json!("--window-size=1280,720")));
        assert!(chrome_args.contains(&json!("--user-agent=TestAgent/1.0")));
        assert!(chrome_args.contains(&json!("--headless=new")));

        let firefox = &caps["moz:firefoxOptions"];
        assert_eq!(firefox["prefs"]["general.useragent.override"], json!("TestAgent/1.0"));
        assert!(firefox["args"].as_array().unwrap().contains(&json!("-headless")));
    }

    #[test]
    fn test_capabilities_headed() {
        let caps = build_capabilities(&config(false));
        let chrome_args = caps["goog:chromeOptions"]["args"].as_array().unwrap();
        assert!(!chrome_args.contains(&json!("--headless=new")));
    }
}
