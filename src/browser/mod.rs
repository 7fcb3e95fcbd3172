//! Browser session management: launching or connecting to Chrome and exposing
//! its active tab to the harvester

pub mod config;
pub mod page;
pub mod session;

pub use config::{ConnectionOptions, LaunchOptions};
pub use page::BrowserPage;
pub use session::BrowserSession;
