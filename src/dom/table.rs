use serde::{Deserialize, Serialize};

/// A table scraped from a page: row 0 is the header, every following row is data.
///
/// Rows are flat cell arrays and are not required to have the same length.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(transparent)]
pub struct Table {
    rows: Vec<Vec<String>>,
}

impl Table {
    /// Create an empty table
    pub fn new() -> Self {
        Self { rows: Vec::new() }
    }

    /// Build a table from raw rows, header first
    pub fn from_rows(rows: Vec<Vec<String>>) -> Self {
        Self { rows }
    }

    /// Header row, if the table has any row at all
    pub fn header(&self) -> Option<&[String]> {
        self.rows.first().map(Vec::as_slice)
    }

    /// Data rows (everything after the header)
    pub fn data_rows(&self) -> &[Vec<String>] {
        self.rows.get(1..).unwrap_or(&[])
    }

    /// All rows, header included
    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }

    /// Consume the table and return its rows
    pub fn into_rows(self) -> Vec<Vec<String>> {
        self.rows
    }

    /// Append a row at the end
    pub fn push(&mut self, row: Vec<String>) {
        self.rows.push(row);
    }

    /// Append many rows at the end
    pub fn extend<I: IntoIterator<Item = Vec<String>>>(&mut self, rows: I) {
        self.rows.extend(rows);
    }

    /// Number of rows, header included
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Number of data rows
    pub fn data_len(&self) -> usize {
        self.rows.len().saturating_sub(1)
    }

    /// Check if the table has no row at all
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

impl<S: Into<String>> FromIterator<Vec<S>> for Table {
    fn from_iter<I: IntoIterator<Item = Vec<S>>>(iter: I) -> Self {
        Self {
            rows: iter
                .into_iter()
                .map(|row| row.into_iter().map(Into::into).collect())
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_header_and_data_rows() {
        let table: Table = vec![vec!["Title", "Phone"], vec!["Acme", "1"], vec!["Beta"]]
            .into_iter()
            .collect();

        assert_eq!(table.header(), Some(&["Title".to_string(), "Phone".to_string()][..]));
        assert_eq!(table.data_rows().len(), 2);
        assert_eq!(table.data_len(), 2);
        assert_eq!(table.data_rows()[1], vec!["Beta".to_string()]);
    }

    #[test]
    fn test_empty_table() {
        let table = Table::new();
        assert!(table.is_empty());
        assert!(table.header().is_none());
        assert!(table.data_rows().is_empty());
        assert_eq!(table.data_len(), 0);
    }

    #[test]
    fn test_serializes_as_nested_arrays() {
        let table: Table = vec![vec!["a", "b"], vec!["1", "2"]].into_iter().collect();
        let json = serde_json::to_string(&table).unwrap();
        assert_eq!(json, r#"[["a","b"],["1","2"]]"#);

        let back: Table = serde_json::from_str(&json).unwrap();
        assert_eq!(back, table);
    }
}
