use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Marker put on clickable candidates by the snapshot script
pub const REF_ATTRIBUTE: &str = "data-harvest-ref";

/// Attribute value carried by the host page's own pagination buttons
pub const PAGINATION_ANALYTICS_ID: &str = "CsvInteractiveTablePaginationButton";

/// A clickable candidate (button, page link, ...) captured from the page
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ControlNode {
    /// HTML tag name (e.g., "button", "a", "li")
    pub tag_name: String,

    /// Element attributes, names lowercased
    #[serde(default)]
    pub attributes: HashMap<String, String>,

    /// Trimmed text content of the element
    #[serde(default)]
    pub text_content: String,

    /// Trimmed text content of the first `span` inside the element
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub span_text: Option<String>,

    /// Class attribute of the parent element
    #[serde(default)]
    pub parent_class: String,

    /// Value of the element's `disabled` property
    #[serde(default)]
    pub disabled: bool,

    /// Reference assigned by the snapshot script, used to click the element later
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub index: Option<usize>,
}

impl ControlNode {
    /// Create a new ControlNode
    pub fn new(tag_name: impl Into<String>) -> Self {
        Self {
            tag_name: tag_name.into(),
            attributes: HashMap::new(),
            text_content: String::new(),
            span_text: None,
            parent_class: String::new(),
            disabled: false,
            index: None,
        }
    }

    /// Builder method: set text content
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text_content = text.into();
        self
    }

    /// Builder method: set span text
    pub fn with_span_text(mut self, text: impl Into<String>) -> Self {
        self.span_text = Some(text.into());
        self
    }

    /// Builder method: set a single attribute
    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.add_attribute(key, value);
        self
    }

    /// Builder method: set the parent's class attribute
    pub fn with_parent_class(mut self, class: impl Into<String>) -> Self {
        self.parent_class = class.into();
        self
    }

    /// Builder method: set the disabled property
    pub fn with_disabled(mut self, disabled: bool) -> Self {
        self.disabled = disabled;
        self
    }

    /// Builder method: set index
    pub fn with_index(mut self, index: usize) -> Self {
        self.index = Some(index);
        self
    }

    /// Add a single attribute
    pub fn add_attribute(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.attributes.insert(key.into(), value.into());
    }

    /// Get attribute value by key
    pub fn get_attribute(&self, key: &str) -> Option<&String> {
        self.attributes.get(key)
    }

    /// Class attribute, empty when absent
    pub fn class_name(&self) -> &str {
        self.get_attribute("class").map_or("", String::as_str)
    }

    /// Check if element has a specific class
    pub fn has_class(&self, class_name: &str) -> bool {
        self.class_name().split_whitespace().any(|c| c == class_name)
    }

    /// Check if element is a specific tag
    pub fn is_tag(&self, tag: &str) -> bool {
        self.tag_name.eq_ignore_ascii_case(tag)
    }

    /// Check if this is one of the host page's own pagination buttons
    pub fn is_pagination_button(&self) -> bool {
        self.is_tag("button")
            && self.get_attribute("analyticsid").map(String::as_str) == Some(PAGINATION_ANALYTICS_ID)
    }

    /// Disabled through the property or through a `disabled` class fragment.
    ///
    /// Loose check used when scanning generic numbered buttons; the state
    /// machine itself only trusts [`ControlNode::disabled`].
    pub fn is_disabled(&self) -> bool {
        self.disabled || self.class_name().contains("disabled")
    }

    /// Whether the element's classes, its parent's classes or its analytics id
    /// suggest it belongs to a pagination bar
    pub fn looks_like_pagination(&self) -> bool {
        let class = self.class_name();
        class.contains("pagination")
            || class.contains("page")
            || self.parent_class.contains("pagination")
            || self.parent_class.contains("page")
            || self
                .get_attribute("analyticsid")
                .is_some_and(|id| id.contains("Pagination"))
    }

    /// Trimmed text of the first span, if any
    pub fn span_text(&self) -> Option<&str> {
        self.span_text.as_deref()
    }

    /// Page number this control points to, read from its text content
    pub fn text_page_number(&self) -> Option<u32> {
        parse_leading_int(&self.text_content)
    }

    /// Short HTML-like rendering for logs
    pub fn to_simple_string(&self) -> String {
        let mut parts = vec![format!("<{}", self.tag_name)];

        if let Some(class) = self.get_attribute("class") {
            parts.push(format!(" class=\"{}\"", class));
        }

        if let Some(index) = self.index {
            parts.push(format!(" {}=\"{}\"", REF_ATTRIBUTE, index));
        }

        if self.disabled {
            parts.push(" disabled".to_string());
        }

        parts.push(">".to_string());

        if !self.text_content.is_empty() {
            parts.push(self.text_content.clone());
        }

        parts.join("")
    }
}

/// Parse the integer at the start of a string, after leading whitespace.
///
/// Mirrors how page numbers are read out of labels like `"3"` or `"12 »"`.
pub fn parse_leading_int(text: &str) -> Option<u32> {
    let trimmed = text.trim_start();
    let end = trimmed
        .char_indices()
        .find(|(_, c)| !c.is_ascii_digit())
        .map_or(trimmed.len(), |(i, _)| i);
    trimmed[..end].parse().ok()
}
