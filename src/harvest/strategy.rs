//! Best-effort detection on a page whose markup we do not control.
//!
//! Each concern (page count, next-page control, listing name) is an ordered
//! list of independent strategies; the first one returning `Some` wins.
//! Strategies never fail, they only come back empty-handed.

use crate::dom::element::parse_leading_int;
use crate::dom::{ControlNode, PageSnapshot};
use regex::Regex;
use std::sync::LazyLock;

/// Largest number a plain numeric button may carry to be read as a page number
const MAX_NUMERIC_PAGE: u32 = 1000;

static PAGE_TEXT_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(?:page\s+\d+\s+(?:sur|of|/)\s+(\d+))|(?:(\d+)\s+pages?)").expect("valid page count pattern")
});

/// Finds how many pages the listing has
pub trait PageCountStrategy: Send + Sync {
    fn name(&self) -> &'static str;
    fn detect(&self, snapshot: &PageSnapshot) -> Option<u32>;
}

/// Finds the control leading to a given page
pub trait NextControlStrategy: Send + Sync {
    fn name(&self) -> &'static str;
    fn locate<'s>(&self, snapshot: &'s PageSnapshot, page: u32) -> Option<&'s ControlNode>;
}

/// Finds a human label (usually a city) for the listing
pub trait CityNameStrategy: Send + Sync {
    fn name(&self) -> &'static str;
    fn resolve(&self, snapshot: &PageSnapshot) -> Option<String>;
}

/// Page number carried by one of the host page's own pagination buttons
fn pagination_button_page(control: &ControlNode) -> Option<u32> {
    let label = [
        control.get_attribute("analyticsval1").map(String::as_str),
        control.get_attribute("label").map(String::as_str),
        control.span_text(),
    ]
    .into_iter()
    .flatten()
    .find(|value| !value.is_empty())?;
    parse_leading_int(label)
}

/// Pagination buttons tagged with the host page's analytics id
pub struct PaginationAttributeCount;

impl PageCountStrategy for PaginationAttributeCount {
    fn name(&self) -> &'static str {
        "pagination_attribute"
    }

    fn detect(&self, snapshot: &PageSnapshot) -> Option<u32> {
        snapshot
            .buttons()
            .filter(|c| c.is_pagination_button())
            .filter_map(pagination_button_page)
            .filter(|&page| page > 0)
            .max()
    }
}

/// Buttons labelled with a plain number inside something that looks like a pager
pub struct NumericButtonCount;

impl PageCountStrategy for NumericButtonCount {
    fn name(&self) -> &'static str {
        "numeric_button"
    }

    fn detect(&self, snapshot: &PageSnapshot) -> Option<u32> {
        snapshot
            .buttons()
            .filter(|c| c.looks_like_pagination())
            .filter_map(ControlNode::text_page_number)
            .filter(|&page| page > 0 && page <= MAX_NUMERIC_PAGE)
            .max()
    }
}

/// "Page 1 of 5", "page 2 sur 7", "12 pages" anywhere in the page text
pub struct PageTextCount;

impl PageCountStrategy for PageTextCount {
    fn name(&self) -> &'static str {
        "page_text"
    }

    fn detect(&self, snapshot: &PageSnapshot) -> Option<u32> {
        PAGE_TEXT_PATTERN
            .captures_iter(&snapshot.page_text)
            .filter_map(|caps| caps.get(1).or_else(|| caps.get(2)))
            .filter_map(|m| m.as_str().parse::<u32>().ok())
            .filter(|&total| total > 0)
            .max()
    }
}

/// Pagination button whose analytics value, label or span text is the page number
pub struct PaginationAttributeControl;

impl NextControlStrategy for PaginationAttributeControl {
    fn name(&self) -> &'static str {
        "pagination_attribute"
    }

    fn locate<'s>(&self, snapshot: &'s PageSnapshot, page: u32) -> Option<&'s ControlNode> {
        let target = page.to_string();
        snapshot.buttons().filter(|c| c.is_pagination_button()).find(|c| {
            c.get_attribute("analyticsval1") == Some(&target)
                || c.get_attribute("label") == Some(&target)
                || c.span_text() == Some(target.as_str())
        })
    }
}

/// Enabled pager-looking button whose text is the page number
pub struct NumericTextControl;

impl NextControlStrategy for NumericTextControl {
    fn name(&self) -> &'static str {
        "numeric_text"
    }

    fn locate<'s>(&self, snapshot: &'s PageSnapshot, page: u32) -> Option<&'s ControlNode> {
        let target = page.to_string();
        snapshot.buttons().find(|c| {
            let labelled = c.text_content == target || c.span_text() == Some(target.as_str());
            let pager_like = c.looks_like_pagination()
                || c.get_attribute("role").map(String::as_str) == Some("button");
            labelled && !c.is_disabled() && pager_like
        })
    }
}

/// Markup conventions for page links, in the order they are tried
#[derive(Debug, Clone, Copy)]
enum PageLinkConvention {
    DataPage,
    DataPageNumber,
    AriaLabel,
    PageClass,
    ButtonTitle,
}

impl PageLinkConvention {
    const ORDERED: [Self; 5] = [
        Self::DataPage,
        Self::DataPageNumber,
        Self::AriaLabel,
        Self::PageClass,
        Self::ButtonTitle,
    ];

    fn matches(self, control: &ControlNode, target: &str) -> bool {
        let attribute = |name: &str| control.get_attribute(name).map(String::as_str);
        match self {
            Self::DataPage => attribute("data-page") == Some(target),
            Self::DataPageNumber => attribute("data-page-number") == Some(target),
            Self::AriaLabel => attribute("aria-label").is_some_and(|label| label.contains(target)),
            Self::PageClass => control.has_class(&format!("page-{}", target)),
            Self::ButtonTitle => control.is_tag("button") && attribute("title") == Some(target),
        }
    }
}

/// Generic markup conventions for page links
pub struct GenericAttributeControl;

impl NextControlStrategy for GenericAttributeControl {
    fn name(&self) -> &'static str {
        "generic_attribute"
    }

    fn locate<'s>(&self, snapshot: &'s PageSnapshot, page: u32) -> Option<&'s ControlNode> {
        let target = page.to_string();
        PageLinkConvention::ORDERED.iter().find_map(|convention| {
            snapshot
                .controls
                .iter()
                .find(|c| convention.matches(c, &target) && !c.disabled)
        })
    }
}

/// The page's `#agent-name` element
pub struct AgentNameLabel;

impl CityNameStrategy for AgentNameLabel {
    fn name(&self) -> &'static str {
        "agent_name"
    }

    fn resolve(&self, snapshot: &PageSnapshot) -> Option<String> {
        snapshot
            .landmarks_for("#agent-name")
            .map(|l| l.text.trim())
            .find(|text| !text.is_empty())
            .map(str::to_string)
    }
}

/// Heading styles used for the listing title
pub struct HeadingLabel;

impl HeadingLabel {
    const SELECTORS: [&'static str; 5] = [
        "h1.text-heading-primary",
        "h2.text-heading-primary",
        "h3.text-heading-primary",
        ".text-heading-m",
        ".font-bold.text-heading-m",
    ];

    const GENERIC_WORDS: [&'static str; 4] = ["phantom", "google", "maps", "export"];
}

impl CityNameStrategy for HeadingLabel {
    fn name(&self) -> &'static str {
        "heading"
    }

    fn resolve(&self, snapshot: &PageSnapshot) -> Option<String> {
        Self::SELECTORS.iter().find_map(|selector| {
            snapshot
                .landmarks_for(selector)
                .map(|l| l.text.trim())
                .find(|text| {
                    let lowered = text.to_lowercase();
                    plausible_label(text) && !Self::GENERIC_WORDS.iter().any(|w| lowered.contains(w))
                })
                .map(str::to_string)
        })
    }
}

/// Breadcrumbs and location labels
pub struct BreadcrumbLabel;

impl BreadcrumbLabel {
    const SELECTORS: [&'static str; 5] = [
        "[role=\"navigation\"] span",
        ".breadcrumb span",
        "nav span",
        ".location-name",
        ".city-name",
    ];
}

impl CityNameStrategy for BreadcrumbLabel {
    fn name(&self) -> &'static str {
        "breadcrumb"
    }

    fn resolve(&self, snapshot: &PageSnapshot) -> Option<String> {
        Self::SELECTORS.iter().find_map(|selector| {
            snapshot
                .landmarks_for(selector)
                .map(|l| l.text.trim())
                .find(|text| plausible_label(text))
                .map(str::to_string)
        })
    }
}

/// Between 3 and 49 characters
fn plausible_label(text: &str) -> bool {
    let len = text.chars().count();
    len > 2 && len < 50
}

/// Ordered strategy lists used by the harvester
pub struct StrategySet {
    page_count: Vec<Box<dyn PageCountStrategy>>,
    next_control: Vec<Box<dyn NextControlStrategy>>,
    city_name: Vec<Box<dyn CityNameStrategy>>,
}

impl Default for StrategySet {
    fn default() -> Self {
        Self {
            page_count: vec![
                Box::new(PaginationAttributeCount),
                Box::new(NumericButtonCount),
                Box::new(PageTextCount),
            ],
            next_control: vec![
                Box::new(PaginationAttributeControl),
                Box::new(NumericTextControl),
                Box::new(GenericAttributeControl),
            ],
            city_name: vec![Box::new(AgentNameLabel), Box::new(HeadingLabel), Box::new(BreadcrumbLabel)],
        }
    }
}

impl StrategySet {
    /// Strategy set with no strategy at all
    pub fn empty() -> Self {
        Self {
            page_count: Vec::new(),
            next_control: Vec::new(),
            city_name: Vec::new(),
        }
    }

    /// Builder method: append a page count strategy
    pub fn with_page_count(mut self, strategy: impl PageCountStrategy + 'static) -> Self {
        self.page_count.push(Box::new(strategy));
        self
    }

    /// Builder method: append a next control strategy
    pub fn with_next_control(mut self, strategy: impl NextControlStrategy + 'static) -> Self {
        self.next_control.push(Box::new(strategy));
        self
    }

    /// Builder method: append a city name strategy
    pub fn with_city_name(mut self, strategy: impl CityNameStrategy + 'static) -> Self {
        self.city_name.push(Box::new(strategy));
        self
    }

    /// Total page count and the strategy that found it
    pub fn detect_total_pages(&self, snapshot: &PageSnapshot) -> Option<(u32, &'static str)> {
        self.page_count
            .iter()
            .find_map(|s| s.detect(snapshot).map(|total| (total, s.name())))
    }

    /// Control leading to `page` and the strategy that found it
    pub fn locate_control<'s>(&self, snapshot: &'s PageSnapshot, page: u32) -> Option<(&'s ControlNode, &'static str)> {
        self.next_control
            .iter()
            .find_map(|s| s.locate(snapshot, page).map(|control| (control, s.name())))
    }

    /// Listing label and the strategy that found it
    pub fn resolve_city_name(&self, snapshot: &PageSnapshot) -> Option<(String, &'static str)> {
        self.city_name
            .iter()
            .find_map(|s| s.resolve(snapshot).map(|name| (name, s.name())))
    }
}
