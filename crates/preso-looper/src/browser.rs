//! Chrome tab backend using the Chrome DevTools Protocol

use crate::error::Result;
use crate::looper::PresentationTab;
use async_trait::async_trait;
use headless_chrome::types::Bounds;
use headless_chrome::{Browser, LaunchOptions, Tab};
use preso_core::{LooperConfig, PresoError};
use serde::Deserialize;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};

/// Configuration for browser launch
#[derive(Debug, Clone)]
pub struct BrowserConfig {
    /// Run in headless mode (default: false, a looping deck is meant to be seen)
    pub headless: bool,
    /// Browser window width
    pub window_width: u32,
    /// Browser window height
    pub window_height: u32,
    /// How long the DevTools connection may stay silent before it is dropped
    pub idle_timeout: Duration,
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            headless: false,
            window_width: 1920,
            window_height: 1080,
            idle_timeout: Duration::from_secs(600),
        }
    }
}

impl BrowserConfig {
    /// Keep the connection alive across several loop intervals
    pub fn from_looper(config: &LooperConfig) -> Self {
        let interval = Duration::from_millis(config.interval_ms);
        Self {
            headless: config.headless,
            idle_timeout: (interval * 4).max(Duration::from_secs(600)),
            ..Default::default()
        }
    }
}

/// Active browser session with one presenting tab
pub struct BrowserSession {
    /// Underlying browser instance (kept alive for tab lifetime)
    #[allow(dead_code)]
    browser: Browser,
    tab: Arc<Tab>,
}

impl BrowserSession {
    /// Launch a new browser instance
    pub async fn launch(config: BrowserConfig) -> Result<Self> {
        info!(
            "Launching browser (headless: {}, size: {}x{})",
            config.headless, config.window_width, config.window_height
        );

        let launch_options = LaunchOptions::default_builder()
            .headless(config.headless)
            .window_size(Some((config.window_width, config.window_height)))
            .idle_browser_timeout(config.idle_timeout)
            .build()
            .map_err(|e| PresoError::Browser(format!("Failed to launch browser: {}", e)))?;

        let browser = Browser::new(launch_options)
            .map_err(|e| PresoError::Browser(format!("Failed to launch browser: {}", e)))?;

        let tab = browser
            .new_tab()
            .map_err(|e| PresoError::Browser(format!("Failed to create tab: {}", e)))?;

        info!("Browser launched successfully");
        Ok(Self { browser, tab })
    }

    /// Connect to an existing browser instance
    ///
    /// # Arguments
    /// * `port` - Chrome DevTools Protocol port (start Chrome with `--remote-debugging-port=9222`)
    pub async fn connect(port: u16, config: BrowserConfig) -> Result<Self> {
        info!("Connecting to existing browser on port {}", port);

        let ws_url = websocket_url(port).await?;
        let browser = Browser::connect_with_timeout(ws_url, config.idle_timeout)
            .map_err(|e| PresoError::Browser(format!("Failed to connect to browser: {}", e)))?;

        let tab = browser
            .new_tab()
            .map_err(|e| PresoError::Browser(format!("Failed to create tab: {}", e)))?;

        info!("Connected to browser successfully");
        Ok(Self { browser, tab })
    }

    /// Launch or attach depending on `debugging_port`
    pub async fn from_config(config: &LooperConfig) -> Result<Self> {
        let browser_config = BrowserConfig::from_looper(config);
        match config.debugging_port {
            Some(port) => Self::connect(port, browser_config).await,
            None => Self::launch(browser_config).await,
        }
    }

    /// Get reference to the active tab
    pub fn tab(&self) -> &Arc<Tab> {
        &self.tab
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DevToolsVersion {
    web_socket_debugger_url: String,
}

/// Browser-level websocket endpoint advertised on `/json/version`
async fn websocket_url(port: u16) -> Result<String> {
    let endpoint = format!("http://127.0.0.1:{}/json/version", port);
    let version: DevToolsVersion = reqwest::get(&endpoint)
        .await
        .map_err(|e| PresoError::Browser(format!("No DevTools endpoint at {}: {}", endpoint, e)))?
        .json()
        .await
        .map_err(|e| PresoError::Browser(format!("Unexpected DevTools response: {}", e)))?;
    debug!("DevTools websocket: {}", version.web_socket_debugger_url);
    Ok(version.web_socket_debugger_url)
}

#[async_trait]
impl PresentationTab for BrowserSession {
    async fn current_url(&self) -> Result<String> {
        Ok(self.tab.get_url())
    }

    async fn navigate(&self, url: &str) -> Result<()> {
        debug!("Navigating to {}", url);

        self.tab
            .navigate_to(url)
            .map_err(|e| PresoError::Browser(format!("Failed to navigate to {}: {}", url, e)))?;

        self.tab
            .wait_until_navigated()
            .map_err(|e| PresoError::Browser(format!("Navigation timeout for {}: {}", url, e)))?;

        Ok(())
    }

    async fn enter_fullscreen(&self) -> Result<()> {
        self.tab
            .set_bounds(Bounds::Fullscreen)
            .map_err(|e| PresoError::Browser(format!("Failed to enter fullscreen: {}", e)))?;
        debug!("Window is fullscreen");
        Ok(())
    }
}

impl Drop for BrowserSession {
    fn drop(&mut self) {
        debug!("BrowserSession dropped, browser will be cleaned up");
    }
}
