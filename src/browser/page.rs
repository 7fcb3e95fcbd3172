use crate::dom::{self, PageSnapshot, Table};
use crate::error::{HarvestError, Result};
use crate::harvest::{ControlHandle, PageHost};
use headless_chrome::Tab;
use std::sync::Arc;

/// A browser tab seen as a [`PageHost`]
pub struct BrowserPage {
    tab: Arc<Tab>,
}

impl BrowserPage {
    pub fn new(tab: Arc<Tab>) -> Self {
        Self { tab }
    }

    /// The underlying tab
    pub fn tab(&self) -> &Arc<Tab> {
        &self.tab
    }
}

impl PageHost for BrowserPage {
    fn extract_table(&mut self) -> Result<Table> {
        dom::extract_table(&self.tab)
    }

    fn snapshot(&mut self) -> Result<PageSnapshot> {
        dom::capture_snapshot(&self.tab)
    }

    fn activate(&mut self, control: &ControlHandle) -> Result<()> {
        let css_selector = &control.selector.css_selector;
        let element = self.tab.find_element(css_selector).map_err(|e| {
            HarvestError::ElementNotFound(format!(
                "Control for page {} ('{}') not found: {}",
                control.page, css_selector, e
            ))
        })?;

        element.click().map_err(|e| HarvestError::ToolExecutionFailed {
            tool: "click".to_string(),
            reason: format!("Failed to click control for page {}: {}", control.page, e),
        })?;

        Ok(())
    }

    fn table_signature(&mut self) -> Result<Option<String>> {
        dom::table_signature(&self.tab)
    }
}
