use crate::{browser::config::{ConnectionOptions, LaunchOptions},
            browser::page::BrowserPage,
            dom::{self, PageSnapshot, Table},
            error::{HarvestError, Result},
            harvest::{Harvester, HarvestReport, PaginationConfig},
            tools::{ToolContext, ToolRegistry}};
use headless_chrome::{Browser, Tab};
use std::{ffi::OsStr, sync::Arc, time::Duration};
use tokio_util::sync::CancellationToken;

/// Browser session that manages a Chrome/Chromium instance
pub struct BrowserSession {
    /// The underlying headless_chrome Browser instance
    browser: Browser,

    /// Tool registry for executing harvest tools
    tool_registry: ToolRegistry,
}

impl BrowserSession {
    /// Launch a new browser instance with the given options
    pub fn launch(options: LaunchOptions) -> Result<Self> {
        let mut launch_opts = headless_chrome::LaunchOptions::default();

        // Listing pages often refuse to render for automation-flagged browsers
        launch_opts.ignore_default_args.push(OsStr::new("--enable-automation"));
        launch_opts.args.push(OsStr::new("--disable-blink-features=AutomationControlled"));

        // Long paginated runs outlive the 30 second default idle timeout
        launch_opts.idle_browser_timeout = Duration::from_secs(60 * 60);

        launch_opts.headless = options.headless;
        launch_opts.window_size = Some((options.window_width, options.window_height));

        if let Some(path) = options.chrome_path {
            launch_opts.path = Some(path);
        }

        if let Some(dir) = options.user_data_dir {
            launch_opts.user_data_dir = Some(dir);
        }

        launch_opts.sandbox = options.sandbox;

        let browser = Browser::new(launch_opts).map_err(|e| HarvestError::LaunchFailed(e.to_string()))?;

        browser.new_tab().map_err(|e| HarvestError::LaunchFailed(format!("Failed to create tab: {}", e)))?;

        Ok(Self { browser, tool_registry: ToolRegistry::with_defaults() })
    }

    /// Connect to an existing browser instance via WebSocket
    pub fn connect(options: ConnectionOptions) -> Result<Self> {
        let browser = Browser::connect_with_timeout(options.ws_url, Duration::from_millis(options.timeout))
            .map_err(|e| HarvestError::ConnectionFailed(e.to_string()))?;

        Ok(Self { browser, tool_registry: ToolRegistry::with_defaults() })
    }

    /// Launch a browser with default options
    pub fn new() -> Result<Self> {
        Self::launch(LaunchOptions::default())
    }

    /// Get the active tab
    pub fn tab(&self) -> Result<Arc<Tab>> {
        self.get_active_tab()
    }

    /// Get all tabs
    pub fn get_tabs(&self) -> Result<Vec<Arc<Tab>>> {
        let tabs = self
            .browser
            .get_tabs()
            .lock()
            .map_err(|e| HarvestError::TabOperationFailed(format!("Failed to get tabs: {}", e)))?
            .clone();

        Ok(tabs)
    }

    /// Get the currently active tab by checking the document visibility and focus state
    pub fn get_active_tab(&self) -> Result<Arc<Tab>> {
        let tabs = self.get_tabs()?;

        // First pass: visible and focused
        for tab in &tabs {
            if Self::evaluates_true(tab, "document.visibilityState === 'visible' && document.hasFocus()") {
                return Ok(tab.clone());
            }
        }

        // Second pass: visible only
        for tab in &tabs {
            if Self::evaluates_true(tab, "document.visibilityState === 'visible'") {
                return Ok(tab.clone());
            }
        }

        // Headless tabs never report focus; fall back to the first one
        tabs.into_iter()
            .next()
            .ok_or_else(|| HarvestError::TabOperationFailed("No active tab found".to_string()))
    }

    fn evaluates_true(tab: &Arc<Tab>, expression: &str) -> bool {
        match tab.evaluate(expression, false) {
            Ok(remote_object) => remote_object
                .value
                .and_then(|value| value.as_bool())
                .unwrap_or(false),
            Err(e) => {
                log::debug!("Failed to check tab status: {}", e);
                false
            }
        }
    }

    /// Get the underlying Browser instance
    pub fn browser(&self) -> &Browser {
        &self.browser
    }

    /// Navigate to a URL using the active tab
    pub fn navigate(&self, url: &str) -> Result<()> {
        self.tab()?
            .navigate_to(url)
            .map_err(|e| HarvestError::NavigationFailed(format!("Failed to navigate to {}: {}", url, e)))?;

        Ok(())
    }

    /// Wait for navigation to complete
    pub fn wait_for_navigation(&self) -> Result<()> {
        self.tab()?
            .wait_until_navigated()
            .map_err(|e| HarvestError::NavigationFailed(format!("Navigation timeout: {}", e)))?;

        Ok(())
    }

    /// The active tab as a page the harvester can drive
    pub fn page(&self) -> Result<BrowserPage> {
        Ok(BrowserPage::new(self.tab()?))
    }

    /// Extract the raw table of the active tab, without deduplication
    pub fn extract_table(&self) -> Result<Table> {
        dom::extract_table(&self.tab()?)
    }

    /// Capture the controls and landmarks of the active tab
    pub fn snapshot(&self) -> Result<PageSnapshot> {
        dom::capture_snapshot(&self.tab()?)
    }

    /// Extract and deduplicate the table of the active tab
    pub fn harvest_page(&self) -> Result<HarvestReport> {
        let mut page = self.page()?;
        Harvester::default().extract_single_page(&mut page)
    }

    /// Extract and deduplicate the table across every page of the active tab's listing
    pub fn harvest_all_pages(&self, config: PaginationConfig, cancel: CancellationToken) -> Result<HarvestReport> {
        let mut page = self.page()?;
        Harvester::new(config)
            .with_cancellation(cancel)
            .extract_all_pages(&mut page)
    }

    /// Get the tool registry
    pub fn tool_registry(&self) -> &ToolRegistry {
        &self.tool_registry
    }

    /// Get mutable tool registry
    pub fn tool_registry_mut(&mut self) -> &mut ToolRegistry {
        &mut self.tool_registry
    }

    /// Execute a tool by name
    pub fn execute_tool(&self, name: &str, params: serde_json::Value) -> Result<crate::tools::ToolResult> {
        let mut context = ToolContext::new(self);
        self.tool_registry.execute(name, params, &mut context)
    }

    /// Close the browser
    pub fn close(&self) -> Result<()> {
        // headless_chrome closes the browser when Browser is dropped; closing
        // every tab is the closest explicit shutdown
        let tabs = self.get_tabs()?;
        for tab in tabs {
            let _ = tab.close(false);
        }
        Ok(())
    }
}
