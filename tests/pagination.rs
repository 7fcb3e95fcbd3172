//! Paginated harvesting against a simulated listing site

use table_harvest::dom::element::PAGINATION_ANALYTICS_ID;
use table_harvest::dom::{ControlNode, Landmark, PageSnapshot, Table};
use table_harvest::harvest::{ControlHandle, HarvestEvent, Harvester, PageHost, PaginationConfig, StopReason};
use table_harvest::{HarvestError, Result};

const HEADER: [&str; 3] = ["Business Name", "Phone", "City"];

/// How the simulated site exposes its pager
#[derive(Clone, Copy)]
enum Pager {
    /// Analytics-tagged buttons for every page, so the total is known up front
    Numbered,
    /// A single `data-page` link to the next page, no total anywhere
    NextLinkOnly,
    /// No pagination controls at all
    None,
}

struct ListingSite {
    pages: Vec<Table>,
    current: usize,
    pager: Pager,
    /// Table signature never changes, as on sites that rerender in place
    frozen_signature: bool,
    /// Page (1-based) whose extraction fails
    failing_page: Option<usize>,
    label: Option<&'static str>,
    /// Class attribute of the numbered pager buttons
    button_class: Option<&'static str>,
    activations: Vec<u32>,
}

impl ListingSite {
    fn new(pages: Vec<Table>, pager: Pager) -> Self {
        Self {
            pages,
            current: 0,
            pager,
            frozen_signature: false,
            failing_page: None,
            label: None,
            button_class: None,
            activations: Vec::new(),
        }
    }

    fn controls(&self) -> Vec<ControlNode> {
        let count = self.pages.len();
        match self.pager {
            Pager::Numbered => (1..=count)
                .map(|page| {
                    let button = ControlNode::new("button")
                        .with_attribute("analyticsid", PAGINATION_ANALYTICS_ID)
                        .with_attribute("analyticsval1", page.to_string())
                        .with_span_text(page.to_string())
                        .with_index(page - 1);
                    match self.button_class {
                        Some(class) => button.with_attribute("class", class),
                        None => button,
                    }
                })
                .collect(),
            Pager::NextLinkOnly if self.current + 1 < count => {
                vec![
                    ControlNode::new("a")
                        .with_attribute("data-page", (self.current + 2).to_string())
                        .with_text("Next")
                        .with_index(0),
                ]
            }
            Pager::NextLinkOnly | Pager::None => Vec::new(),
        }
    }
}

impl PageHost for ListingSite {
    fn extract_table(&mut self) -> Result<Table> {
        if self.failing_page == Some(self.current + 1) {
            return Err(HarvestError::EvaluationFailed("page crashed".to_string()));
        }
        Ok(self.pages[self.current].clone())
    }

    fn snapshot(&mut self) -> Result<PageSnapshot> {
        let landmarks = self
            .label
            .map(|label| vec![Landmark::new("#agent-name", label)])
            .unwrap_or_default();
        Ok(PageSnapshot::new(self.controls(), landmarks, ""))
    }

    fn activate(&mut self, control: &ControlHandle) -> Result<()> {
        self.activations.push(control.page);
        self.current = control.page as usize - 1;
        Ok(())
    }

    fn table_signature(&mut self) -> Result<Option<String>> {
        if self.frozen_signature {
            return Ok(Some("static".to_string()));
        }
        Ok(Some(format!("{:?}", self.pages[self.current])))
    }
}

fn page(rows: &[(&str, &str)]) -> Table {
    let mut table = Table::new();
    table.push(HEADER.iter().map(|s| s.to_string()).collect());
    for (name, phone) in rows {
        table.push(vec![name.to_string(), phone.to_string(), "Lyon".to_string()]);
    }
    table
}

fn three_pages() -> Vec<Table> {
    vec![
        page(&[("Acme Realty", "01 23 45 67 01"), ("Beta Homes", "01 23 45 67 02")]),
        page(&[("Gamma Immo", "01 23 45 67 03"), ("Delta & Co", "01 23 45 67 04")]),
        page(&[("Epsilon", "01 23 45 67 05")]),
    ]
}

fn harvester() -> Harvester {
    Harvester::new(PaginationConfig::immediate())
}

fn stopped(report_events: &[HarvestEvent]) -> Option<&StopReason> {
    report_events.iter().find_map(|event| match event {
        HarvestEvent::PaginationStopped { reason, .. } => Some(reason),
        _ => None,
    })
}

#[test]
fn known_total_visits_every_page() {
    let mut site = ListingSite::new(three_pages(), Pager::Numbered);
    let report = harvester().extract_all_pages(&mut site).unwrap();

    assert_eq!(site.activations, vec![2, 3]);
    assert_eq!(report.pages_processed, Some(3));
    assert_eq!(report.original_count, 5);
    assert_eq!(report.deduplicated_count, 5);
    assert_eq!(report.rows.len(), 6);
    assert_eq!(stopped(&report.events), Some(&StopReason::LastPageReached));
    assert!(report.events.contains(&HarvestEvent::TotalPagesDetected {
        total: Some(3),
        strategy: Some("pagination_attribute".to_string()),
    }));
}

#[test]
fn disabled_variant_class_does_not_stop_enabled_buttons() {
    let mut site = ListingSite::new(three_pages(), Pager::Numbered);
    site.button_class = Some("px-2 disabled:opacity-50");
    let report = harvester().extract_all_pages(&mut site).unwrap();

    assert_eq!(site.activations, vec![2, 3]);
    assert_eq!(report.pages_processed, Some(3));
    assert_eq!(stopped(&report.events), Some(&StopReason::LastPageReached));
}

#[test]
fn header_is_kept_once() {
    let mut site = ListingSite::new(three_pages(), Pager::Numbered);
    let report = harvester().extract_all_pages(&mut site).unwrap();

    let header: Vec<String> = HEADER.iter().map(|s| s.to_string()).collect();
    assert_eq!(report.rows.header(), Some(header.as_slice()));
    assert_eq!(report.rows.rows().iter().filter(|row| **row == header).count(), 1);
    assert_eq!(report.rows.rows()[5][0], "Epsilon");
}

#[test]
fn counts_leave_the_header_out() {
    let mut site = ListingSite::new(three_pages(), Pager::None);
    let report = harvester().extract_single_page(&mut site).unwrap();

    assert_eq!(report.rows.len(), 3);
    assert_eq!(report.original_count, 2);
    assert_eq!(report.deduplicated_count, 2);
    assert_eq!(report.status_message(), "Export completed! 2 rows exported.");
}

#[test]
fn missing_pager_yields_one_page() {
    let mut site = ListingSite::new(three_pages(), Pager::None);
    let report = harvester().extract_all_pages(&mut site).unwrap();

    assert!(site.activations.is_empty());
    assert_eq!(report.pages_processed, Some(1));
    assert_eq!(report.deduplicated_count, 2);
    assert_eq!(stopped(&report.events), Some(&StopReason::NoNextControl));
}

#[test]
fn unknown_total_follows_controls_until_none_left() {
    let mut site = ListingSite::new(three_pages(), Pager::NextLinkOnly);
    let report = harvester().extract_all_pages(&mut site).unwrap();

    assert_eq!(site.activations, vec![2, 3]);
    assert_eq!(report.pages_processed, Some(3));
    assert_eq!(report.deduplicated_count, 5);
    assert_eq!(stopped(&report.events), Some(&StopReason::NoNextControl));
    assert!(report.events.contains(&HarvestEvent::TotalPagesDetected { total: None, strategy: None }));
    assert!(report.events.contains(&HarvestEvent::NavigationStarted {
        page: 2,
        strategy: "generic_attribute".to_string(),
    }));
}

#[test]
fn duplicates_across_pages_are_dropped() {
    let pages = vec![
        page(&[("Acme Realty", "01 23 45 67 01"), ("Beta Homes", "01 23 45 67 02")]),
        page(&[("ACME Realty.", "09 99 99 99 99"), ("Gamma Immo", "01 23 45 67 02")]),
        page(&[("Delta", "01 23 45 67 04")]),
    ];
    let mut site = ListingSite::new(pages, Pager::Numbered);
    let report = harvester().extract_all_pages(&mut site).unwrap();

    assert_eq!(report.original_count, 5);
    assert_eq!(report.deduplicated_count, 3);
    assert_eq!(report.duplicates_removed(), 2);
    assert_eq!(report.status_message(), "Export completed! 3 rows exported (2 duplicates removed).");

    let names: Vec<&str> = report.rows.data_rows().iter().map(|row| row[0].as_str()).collect();
    assert_eq!(names, vec!["Acme Realty", "Beta Homes", "Delta"]);
}

#[test]
fn stabilization_timeout_warns_and_continues() {
    let mut site = ListingSite::new(three_pages(), Pager::Numbered);
    site.frozen_signature = true;
    let report = harvester().extract_all_pages(&mut site).unwrap();

    assert_eq!(report.pages_processed, Some(3));
    assert_eq!(report.deduplicated_count, 5);

    let timed_out: Vec<u32> = report
        .events
        .iter()
        .filter_map(|event| match event {
            HarvestEvent::StabilizationTimedOut { page, .. } => Some(*page),
            _ => None,
        })
        .collect();
    assert_eq!(timed_out, vec![2, 3]);
    assert_eq!(report.warnings().count(), 2);
}

#[test]
fn changed_table_is_reported_stable() {
    let mut site = ListingSite::new(three_pages(), Pager::Numbered);
    let report = harvester().extract_all_pages(&mut site).unwrap();

    assert!(report
        .events
        .iter()
        .any(|event| matches!(event, HarvestEvent::PageStabilized { page: 2, .. })));
    assert_eq!(report.warnings().count(), 0);
}

#[test]
fn host_error_fails_the_run() {
    let mut site = ListingSite::new(three_pages(), Pager::Numbered);
    site.failing_page = Some(2);

    let result = harvester().extract_all_pages(&mut site);
    assert!(matches!(result, Err(HarvestError::EvaluationFailed(_))));
    assert_eq!(site.activations, vec![2]);
}

#[test]
fn max_pages_caps_the_walk() {
    let mut site = ListingSite::new(three_pages(), Pager::Numbered);
    let report = Harvester::new(PaginationConfig::immediate().max_pages(2))
        .extract_all_pages(&mut site)
        .unwrap();

    assert_eq!(site.activations, vec![2]);
    assert_eq!(report.pages_processed, Some(2));
    assert_eq!(report.deduplicated_count, 4);
    assert_eq!(stopped(&report.events), Some(&StopReason::MaxPagesReached));
}

#[test]
fn table_without_identity_columns_is_returned_unchanged() {
    let table: Table = vec![
        vec!["City", "Count"],
        vec!["Lyon", "3"],
        vec!["Lyon", "3"],
    ]
    .into_iter()
    .collect();
    let mut site = ListingSite::new(vec![table.clone()], Pager::None);
    let report = harvester().extract_all_pages(&mut site).unwrap();

    assert!(report.deduplication_skipped);
    assert_eq!(report.rows, table);
    assert_eq!(report.original_count, 2);
    assert_eq!(report.deduplicated_count, 2);
    assert!(report.events.contains(&HarvestEvent::DeduplicationSkipped));
    assert_eq!(report.warnings().count(), 1);
}

#[test]
fn listing_label_names_the_report() {
    let mut site = ListingSite::new(three_pages(), Pager::None);
    site.label = Some("  Lyon 3e  ");
    let report = harvester().extract_single_page(&mut site).unwrap();

    assert_eq!(report.city_name.as_deref(), Some("Lyon 3e"));
    assert_eq!(report.pages_processed, None);
    assert!(!report.is_complete());
}

#[test]
fn empty_page_reports_no_table() {
    let mut site = ListingSite::new(vec![Table::new()], Pager::None);
    let report = harvester().extract_single_page(&mut site).unwrap();

    assert!(report.rows.is_empty());
    assert_eq!(report.original_count, 0);
    assert_eq!(report.status_message(), "No table found on this page.");
}
