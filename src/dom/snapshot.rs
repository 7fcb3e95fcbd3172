use crate::dom::element::ControlNode;
use crate::dom::selector_map::{ElementSelector, SelectorMap};
use crate::error::{HarvestError, Result};
use headless_chrome::Tab;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Text of an element matched by one of the label selectors tried for a listing name
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Landmark {
    /// Selector that matched the element
    pub selector: String,

    /// Trimmed text content
    pub text: String,
}

impl Landmark {
    pub fn new(selector: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            selector: selector.into(),
            text: text.into(),
        }
    }
}

/// What the detection strategies get to see of the live page
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PageSnapshot {
    /// Clickable candidates, in document order
    #[serde(default)]
    pub controls: Vec<ControlNode>,

    /// Label candidates, in probing order
    #[serde(default)]
    pub landmarks: Vec<Landmark>,

    /// Text content of the whole document
    #[serde(default)]
    pub page_text: String,

    /// Map of control references to selectors
    #[serde(skip)]
    pub selector_map: SelectorMap,
}

impl PageSnapshot {
    /// Create a snapshot from already captured parts
    pub fn new(controls: Vec<ControlNode>, landmarks: Vec<Landmark>, page_text: impl Into<String>) -> Self {
        let mut snapshot = Self {
            controls,
            landmarks,
            page_text: page_text.into(),
            selector_map: SelectorMap::new(),
        };
        snapshot.build_selector_map();
        snapshot
    }

    /// Capture a snapshot of the page loaded in a browser tab.
    ///
    /// The script marks every candidate control with a reference attribute so
    /// that it can be clicked again through [`PageSnapshot::selector_for`].
    pub fn from_tab(tab: &Arc<Tab>) -> Result<Self> {
        let js_code = include_str!("page_snapshot.js");

        let result = tab
            .evaluate(js_code, false)
            .map_err(|e| HarvestError::SnapshotFailed(format!("Failed to execute snapshot script: {}", e)))?;

        let json_value = result
            .value
            .ok_or_else(|| HarvestError::SnapshotFailed("No value returned from snapshot script".to_string()))?;

        // The script returns a JSON string
        let json_str: String = serde_json::from_value(json_value)
            .map_err(|e| HarvestError::SnapshotFailed(format!("Failed to get JSON string: {}", e)))?;

        let mut snapshot: PageSnapshot = serde_json::from_str(&json_str)
            .map_err(|e| HarvestError::SnapshotFailed(format!("Failed to parse snapshot JSON: {}", e)))?;

        snapshot.build_selector_map();
        log::debug!(
            "Snapshot captured: {} controls, {} landmarks",
            snapshot.controls.len(),
            snapshot.landmarks.len()
        );

        Ok(snapshot)
    }

    fn build_selector_map(&mut self) {
        self.selector_map = SelectorMap::from_controls(&self.controls);
    }

    /// Selector for a control of this snapshot
    pub fn selector_for(&self, control: &ControlNode) -> Option<&ElementSelector> {
        control.index.and_then(|index| self.selector_map.get(index))
    }

    /// Controls that are `<button>` elements
    pub fn buttons(&self) -> impl Iterator<Item = &ControlNode> {
        self.controls.iter().filter(|c| c.is_tag("button"))
    }

    /// Landmarks matched by a given selector, in document order
    pub fn landmarks_for<'a>(&'a self, selector: &'a str) -> impl Iterator<Item = &'a Landmark> + 'a {
        self.landmarks.iter().filter(move |l| l.selector == selector)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_snapshot_from_json() {
        let json = r##"{
            "controls": [
                {"tag_name": "button", "text_content": "1", "index": 0},
                {"tag_name": "a", "text_content": "2", "attributes": {"data-page": "2"}, "index": 1}
            ],
            "landmarks": [{"selector": "#agent-name", "text": "Lyon"}],
            "page_text": "Page 1 of 2"
        }"##;

        let mut snapshot: PageSnapshot = serde_json::from_str(json).unwrap();
        snapshot.build_selector_map();

        assert_eq!(snapshot.controls.len(), 2);
        assert_eq!(snapshot.buttons().count(), 1);
        assert_eq!(snapshot.selector_map.len(), 2);
        assert_eq!(
            snapshot.selector_for(&snapshot.controls[1]).unwrap().css_selector,
            "[data-harvest-ref=\"1\"]"
        );
        assert_eq!(snapshot.landmarks_for("#agent-name").count(), 1);
        assert_eq!(snapshot.page_text, "Page 1 of 2");
    }

    #[test]
    fn test_selector_for_unreferenced_control() {
        let snapshot = PageSnapshot::new(vec![ControlNode::new("button").with_text("2")], Vec::new(), "");
        assert!(snapshot.selector_for(&snapshot.controls[0]).is_none());
    }

    #[test]
    fn test_empty_snapshot_json() {
        let snapshot: PageSnapshot = serde_json::from_str("{}").unwrap();
        assert!(snapshot.controls.is_empty());
        assert!(snapshot.landmarks.is_empty());
        assert!(snapshot.page_text.is_empty());
    }
}
