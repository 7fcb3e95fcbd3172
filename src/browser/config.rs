use std::path::PathBuf;

/// Options for launching a new browser instance
#[derive(Debug, Clone)]
pub struct LaunchOptions {
    /// Run the browser without a visible window (default: true)
    pub headless: bool,

    /// Window width in pixels (default: 1280)
    pub window_width: u32,

    /// Window height in pixels (default: 800)
    pub window_height: u32,

    /// Path to a Chrome/Chromium binary, auto-detected when unset
    pub chrome_path: Option<PathBuf>,

    /// Persistent profile directory, so logged-in sessions survive restarts
    pub user_data_dir: Option<PathBuf>,

    /// Enable the Chrome sandbox (default: true)
    pub sandbox: bool,
}

impl Default for LaunchOptions {
    fn default() -> Self {
        Self {
            headless: true,
            window_width: 1280,
            window_height: 800,
            chrome_path: None,
            user_data_dir: None,
            sandbox: true,
        }
    }
}

impl LaunchOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder method: set headless mode
    pub fn headless(mut self, headless: bool) -> Self {
        self.headless = headless;
        self
    }

    /// Builder method: set window size
    pub fn window_size(mut self, width: u32, height: u32) -> Self {
        self.window_width = width;
        self.window_height = height;
        self
    }

    /// Builder method: set Chrome binary path
    pub fn chrome_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.chrome_path = Some(path.into());
        self
    }

    /// Builder method: set user data directory
    pub fn user_data_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.user_data_dir = Some(dir.into());
        self
    }

    /// Builder method: set sandbox mode
    pub fn sandbox(mut self, sandbox: bool) -> Self {
        self.sandbox = sandbox;
        self
    }
}

/// Options for connecting to an already running browser
#[derive(Debug, Clone)]
pub struct ConnectionOptions {
    /// DevTools WebSocket URL (e.g. `ws://127.0.0.1:9222/devtools/browser/...`)
    pub ws_url: String,

    /// Connection timeout in milliseconds (default: 30000)
    pub timeout: u64,
}

impl ConnectionOptions {
    pub fn new(ws_url: impl Into<String>) -> Self {
        Self {
            ws_url: ws_url.into(),
            timeout: 30_000,
        }
    }

    /// Builder method: set connection timeout in milliseconds
    pub fn timeout(mut self, timeout: u64) -> Self {
        self.timeout = timeout;
        self
    }
}
