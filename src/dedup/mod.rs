//! Row deduplication by business identity
//!
//! A table's name and phone columns are found by header keyword. Each data row
//! is reduced to a set of identity keys (`name:...`, `phone:...`) and a row is
//! dropped as soon as any one of its keys was already produced by an earlier
//! kept row.

pub mod normalize;

pub use normalize::{MIN_PHONE_DIGITS, normalize_name, normalize_phone};

use crate::dom::Table;
use serde::Serialize;
use std::collections::HashSet;

/// Header keywords identifying the business name column
pub const NAME_KEYWORDS: &[&str] = &["title", "nom", "name", "business name", "establishment"];

/// Header keywords identifying the phone number column
pub const PHONE_KEYWORDS: &[&str] = &["phone", "telephone", "tel", "number", "numéro", "téléphone"];

/// Role a column plays in identifying a business
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ColumnRole {
    Name,
    Phone,
}

impl ColumnRole {
    /// Keywords searched for in header labels
    pub fn keywords(self) -> &'static [&'static str] {
        match self {
            ColumnRole::Name => NAME_KEYWORDS,
            ColumnRole::Phone => PHONE_KEYWORDS,
        }
    }

    /// Tag prefixed to identity keys built from this column
    pub fn tag(self) -> &'static str {
        match self {
            ColumnRole::Name => "name",
            ColumnRole::Phone => "phone",
        }
    }

    fn normalize(self, cell: &str) -> String {
        match self {
            ColumnRole::Name => normalize_name(cell),
            ColumnRole::Phone => normalize_phone(cell),
        }
    }
}

/// Find the first header (left to right) containing any of the keywords, case-insensitively
pub fn find_column_index(headers: &[String], keywords: &[&str]) -> Option<usize> {
    headers.iter().position(|header| {
        let label = header.trim().to_lowercase();
        keywords
            .iter()
            .any(|keyword| label.contains(&keyword.to_lowercase()))
    })
}

/// Columns resolved for each identity role of a table
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct IdentityColumns {
    pub name: Option<usize>,
    pub phone: Option<usize>,
}

impl IdentityColumns {
    /// Resolve the identity columns of a header row
    pub fn resolve(headers: &[String]) -> Self {
        Self {
            name: find_column_index(headers, ColumnRole::Name.keywords()),
            phone: find_column_index(headers, ColumnRole::Phone.keywords()),
        }
    }

    /// Check if no identity column was found
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.phone.is_none()
    }

    fn roles(&self) -> impl Iterator<Item = (ColumnRole, usize)> {
        [
            self.name.map(|index| (ColumnRole::Name, index)),
            self.phone.map(|index| (ColumnRole::Phone, index)),
        ]
        .into_iter()
        .flatten()
    }

    /// Build the identity keys of a row; missing or unusable cells contribute nothing
    pub fn identity_keys(&self, row: &[String]) -> Vec<String> {
        self.roles()
            .filter_map(|(role, index)| {
                let cell = row.get(index)?;
                let normalized = role.normalize(cell);
                if normalized.is_empty() {
                    None
                } else {
                    Some(format!("{}:{}", role.tag(), normalized))
                }
            })
            .collect()
    }
}

/// Counts observed during one deduplication pass, in data rows
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct DedupStats {
    pub original: usize,
    pub kept: usize,
    pub discarded: usize,
}

/// A data row dropped because one of its keys was already seen
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DuplicateRow {
    /// 1-based row number in the input table, header being row 1
    pub row_number: usize,
    pub keys: Vec<String>,
}

/// Result of a deduplication pass
#[derive(Debug, Clone, PartialEq)]
pub struct Deduplication {
    pub table: Table,
    pub stats: DedupStats,
    pub columns: IdentityColumns,
    /// Set when no identity column was found and the table was left as is
    pub skipped: bool,
    pub duplicates: Vec<DuplicateRow>,
}

impl Deduplication {
    fn unchanged(table: &Table, columns: IdentityColumns, skipped: bool) -> Self {
        let rows = table.data_len();
        Self {
            table: table.clone(),
            stats: DedupStats { original: rows, kept: rows, discarded: 0 },
            columns,
            skipped,
            duplicates: Vec::new(),
        }
    }
}

/// Remove rows describing a business already present earlier in the table.
///
/// A row is kept when it has no identity key at all, or when none of its keys
/// has been seen; matching on name OR phone is enough to drop a row.
pub fn deduplicate(table: &Table) -> Deduplication {
    let Some(headers) = table.header() else {
        return Deduplication::unchanged(table, IdentityColumns::default(), false);
    };
    if table.data_rows().is_empty() {
        return Deduplication::unchanged(table, IdentityColumns::default(), false);
    }

    let columns = IdentityColumns::resolve(headers);
    log::debug!("Identity columns - name: {:?}, phone: {:?}", columns.name, columns.phone);
    log::debug!("Available headers: {:?}", headers);

    if columns.is_empty() {
        return Deduplication::unchanged(table, columns, true);
    }

    let mut seen_keys: HashSet<String> = HashSet::new();
    let mut output = Table::new();
    output.push(headers.to_vec());
    let mut duplicates = Vec::new();

    for (offset, row) in table.data_rows().iter().enumerate() {
        let keys = columns.identity_keys(row);

        if keys.is_empty() {
            output.push(row.clone());
            continue;
        }

        if keys.iter().any(|key| seen_keys.contains(key)) {
            duplicates.push(DuplicateRow { row_number: offset + 2, keys });
            continue;
        }

        seen_keys.extend(keys);
        output.push(row.clone());
    }

    let original = table.data_len();
    let kept = output.data_len();

    Deduplication {
        table: output,
        stats: DedupStats { original, kept, discarded: original - kept },
        columns,
        skipped: false,
        duplicates,
    }
}
