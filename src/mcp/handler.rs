use crate::browser::{BrowserSession, ConnectionOptions, LaunchOptions};
use crate::error::Result as HarvestResult;
use rmcp::handler::server::router::tool::ToolRouter;
use rmcp::model::{ServerCapabilities, ServerInfo};
use rmcp::{ServerHandler, tool_handler};
use std::sync::{Arc, Mutex, MutexGuard};

/// MCP server exposing the harvest tools over one shared browser session
#[derive(Clone)]
pub struct HarvestServer {
    session: Arc<Mutex<BrowserSession>>,
    pub(crate) tool_router: ToolRouter<Self>,
}

impl HarvestServer {
    /// Launch a headless browser and serve it
    pub fn new() -> HarvestResult<Self> {
        Self::with_options(LaunchOptions::default())
    }

    /// Launch a browser with the given options and serve it
    pub fn with_options(options: LaunchOptions) -> HarvestResult<Self> {
        Ok(Self::with_session(BrowserSession::launch(options)?))
    }

    /// Serve an already running browser
    pub fn connect(options: ConnectionOptions) -> HarvestResult<Self> {
        Ok(Self::with_session(BrowserSession::connect(options)?))
    }

    pub fn with_session(session: BrowserSession) -> Self {
        Self {
            session: Arc::new(Mutex::new(session)),
            tool_router: Self::tool_router(),
        }
    }

    /// Exclusive access to the session; one tool runs at a time
    pub(crate) fn session(&self) -> MutexGuard<'_, BrowserSession> {
        // A panicking tool leaves the session usable
        self.session.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[tool_handler]
impl ServerHandler for HarvestServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            instructions: Some(
                "Scrapes the listing table of a web page. Call harvest_navigate with the listing URL, \
                 then harvest_extract_table for the visible page or harvest_extract_all_pages to walk \
                 every page. Rows are deduplicated by business name and phone number and returned \
                 with a CSV rendering."
                    .into(),
            ),
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            ..Default::default()
        }
    }
}
