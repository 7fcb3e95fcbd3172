use crate::dom::element::{ControlNode, REF_ATTRIBUTE};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Information needed to locate a control again after it was snapshotted
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ElementSelector {
    /// CSS selector for the element
    pub css_selector: String,

    /// Element's tag name
    pub tag_name: String,

    /// Element's text content (truncated for display)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

impl ElementSelector {
    /// Create a new ElementSelector with CSS selector
    pub fn new(css_selector: impl Into<String>, tag_name: impl Into<String>) -> Self {
        Self {
            css_selector: css_selector.into(),
            tag_name: tag_name.into(),
            text: None,
        }
    }

    /// Selector matching the element marked with the given snapshot reference
    pub fn for_ref(index: usize, tag_name: impl Into<String>) -> Self {
        Self::new(format!("[{}=\"{}\"]", REF_ATTRIBUTE, index), tag_name)
    }

    /// Builder method: set text content
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }
}

/// Map of snapshot references to their selectors
/// Uses IndexMap to preserve document order
#[derive(Debug, Clone, Default)]
pub struct SelectorMap {
    map: IndexMap<usize, ElementSelector>,
}

impl SelectorMap {
    /// Create a new empty SelectorMap
    pub fn new() -> Self {
        Self { map: IndexMap::new() }
    }

    /// Build the map from snapshotted controls; controls without a reference are skipped
    pub fn from_controls(controls: &[ControlNode]) -> Self {
        let mut map = Self::new();
        for control in controls {
            if let Some(index) = control.index {
                map.insert(index, Self::selector_for(control, index));
            }
        }
        map
    }

    fn selector_for(control: &ControlNode, index: usize) -> ElementSelector {
        let selector = ElementSelector::for_ref(index, &control.tag_name);
        let text = control.text_content.as_str();
        if text.is_empty() {
            return selector;
        }

        // Truncate text for display
        let truncated = if text.chars().count() > 50 {
            format!("{}...", text.chars().take(47).collect::<String>())
        } else {
            text.to_string()
        };
        selector.with_text(truncated)
    }

    /// Register a selector under the given reference
    pub fn insert(&mut self, index: usize, selector: ElementSelector) {
        self.map.insert(index, selector);
    }

    /// Get selector by reference
    pub fn get(&self, index: usize) -> Option<&ElementSelector> {
        self.map.get(&index)
    }

    /// Get the number of registered elements
    pub fn len(&self) -> usize {
        self.map.len()
    }

    /// Check if the map is empty
    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_selector_for_ref() {
        let selector = ElementSelector::for_ref(3, "button").with_text("4");

        assert_eq!(selector.css_selector, "[data-harvest-ref=\"3\"]");
        assert_eq!(selector.tag_name, "button");
        assert_eq!(selector.text, Some("4".to_string()));
    }

    #[test]
    fn test_from_controls_skips_unreferenced() {
        let controls = vec![
            ControlNode::new("button").with_text("1").with_index(0),
            ControlNode::new("button").with_text("2"),
            ControlNode::new("a").with_text("3").with_index(5),
        ];

        let map = SelectorMap::from_controls(&controls);

        assert_eq!(map.len(), 2);
        assert!(map.get(0).is_some());
        assert!(map.get(1).is_none());
        assert_eq!(map.get(5).unwrap().tag_name, "a");
    }

    #[test]
    fn test_long_text_truncated() {
        let long = "x".repeat(80);
        let controls = vec![ControlNode::new("button").with_text(long).with_index(0)];

        let map = SelectorMap::from_controls(&controls);
        let text = map.get(0).unwrap().text.clone().unwrap();
        assert_eq!(text.chars().count(), 50);
        assert!(text.ends_with("..."));
    }
}
