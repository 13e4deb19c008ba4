//! Dataset generation and persistence for task presentations.
//!
//! Every generator re-randomizes on each call. `CsvDatasetStore` writes each table to a
//! new uniquely named file, so two presentations never share a dataset reference.

use std::fmt::Write as _;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use chrono::{Duration, NaiveDate};
use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use uuid::Uuid;

use crate::errors::InterviewError;

/// A generated tabular dataset: header row plus string cells.
#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    pub headers: Vec<&'static str>,
    pub rows: Vec<Vec<String>>,
}

impl Table {
    pub fn new(headers: Vec<&'static str>) -> Self {
        Self {
            headers,
            rows: Vec::new(),
        }
    }

    pub fn push(&mut self, row: Vec<String>) {
        debug_assert_eq!(row.len(), self.headers.len());
        self.rows.push(row);
    }

    /// Index of the named column.
    pub fn column(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| *h == name)
    }

    /// Iterates over the values of the named column.
    #[cfg(test)]
    pub fn values<'a>(&'a self, name: &str) -> impl Iterator<Item = &'a str> + 'a {
        let idx = self.column(name);
        self.rows
            .iter()
            .filter_map(move |row| idx.and_then(|i| row.get(i)).map(String::as_str))
    }

    /// Renders the table as comma-separated text with a header line.
    pub fn to_csv(&self) -> String {
        let mut out = String::new();
        write_record(&mut out, self.headers.iter().copied());
        for row in &self.rows {
            write_record(&mut out, row.iter().map(String::as_str));
        }
        out
    }
}

fn write_record<'a>(out: &mut String, fields: impl Iterator<Item = &'a str>) {
    for (i, field) in fields.enumerate() {
        if i > 0 {
            out.push(',');
        }
        if field.contains([',', '"', '\n', '\r']) {
            let _ = write!(out, "\"{}\"", field.replace('"', "\"\""));
        } else {
            out.push_str(field);
        }
    }
    out.push('\n');
}

/// Handle to a persisted dataset, offered to the candidate as a download.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DatasetRef(PathBuf);

impl DatasetRef {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self(path.into())
    }

    pub fn path(&self) -> &Path {
        &self.0
    }
}

/// Persists a freshly generated table and hands back a reference to it.
///
/// `provide` is called once per task presentation and must produce a new reference
/// rather than reuse an earlier one. `discard` is called once a reference is no longer
/// reachable from any interview.
#[async_trait]
pub trait DatasetProvider: Send + Sync {
    async fn provide(&self, task_id: &str, table: &Table) -> Result<DatasetRef, InterviewError>;

    async fn discard(&self, dataset: &DatasetRef) -> Result<(), InterviewError>;
}

/// Writes datasets as `<task_id>-<uuid>.csv` under a fixed directory.
pub struct CsvDatasetStore {
    dir: PathBuf,
}

impl CsvDatasetStore {
    /// Creates the store, making the directory if it does not exist.
    pub fn new(dir: impl Into<PathBuf>) -> Result<Self, InterviewError> {
        let dir = dir.into();
        std::fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }
}

#[async_trait]
impl DatasetProvider for CsvDatasetStore {
    async fn provide(&self, task_id: &str, table: &Table) -> Result<DatasetRef, InterviewError> {
        let path = self.dir.join(format!("{task_id}-{}.csv", Uuid::new_v4()));
        tokio::fs::write(&path, table.to_csv()).await?;
        debug!(task_id, path = %path.display(), rows = table.rows.len(), "Dataset written");
        Ok(DatasetRef(path))
    }

    async fn discard(&self, dataset: &DatasetRef) -> Result<(), InterviewError> {
        match tokio::fs::remove_file(dataset.path()).await {
            Ok(()) => {
                debug!(path = %dataset.path().display(), "Dataset removed");
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                warn!(path = %dataset.path().display(), "Dataset already gone");
                Ok(())
            }
            Err(e) => Err(e.into()),
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Generators
// ────────────────────────────────────────────────────────────────────────────

/// Produces a fresh randomized table for one presentation of a task.
pub type DatasetGenerator = fn() -> Table;

const PRODUCTS: [&str; 5] = ["Laptop", "Mouse", "Keyboard", "Monitor", "Webcam"];
const REGIONS: [&str; 4] = ["North", "South", "East", "West"];
const DEPARTMENTS: [&str; 3] = ["HR", "Engineering", "Sales"];
const INVENTORY_ITEMS: [&str; 4] = ["T-Shirt", "Mug", "Pen", "Sticker"];
const PROJECT_STATUSES: [&str; 3] = ["Completed", "In Progress", "On Hold"];
const FIRST_NAMES: [&str; 4] = ["John", "Jane", "Peter", "Mary"];
const LAST_NAMES: [&str; 3] = ["Smith", "Doe", "Jones"];
const FRUITS: [&str; 3] = ["Apples", "Bananas", "Cherries"];

fn pick<R: Rng>(rng: &mut R, options: &[&str]) -> String {
    options.choose(rng).copied().unwrap_or_default().to_string()
}

pub fn sales_data() -> Table {
    let mut rng = rand::thread_rng();
    let start = NaiveDate::from_ymd_opt(2025, 1, 1).unwrap_or_default();
    let mut table = Table::new(vec![
        "Date",
        "Region",
        "Product",
        "Units Sold",
        "Price per Unit",
    ]);
    for _ in 0..50 {
        let date = start + Duration::days(rng.gen_range(0..=200));
        table.push(vec![
            date.format("%Y-%m-%d").to_string(),
            pick(&mut rng, &REGIONS),
            pick(&mut rng, &PRODUCTS),
            rng.gen_range(5..=50).to_string(),
            rng.gen_range(800..=15000).to_string(),
        ]);
    }
    table
}

pub fn employee_data() -> Table {
    let mut rng = rand::thread_rng();
    let mut table = Table::new(vec!["Employee ID", "Department", "Salary"]);
    for i in 1..=50 {
        table.push(vec![
            format!("EMP-{i:03}"),
            pick(&mut rng, &DEPARTMENTS),
            rng.gen_range(50_000..=120_000).to_string(),
        ]);
    }
    table
}

/// Inventory with intentional duplicate `ItemID` rows.
pub fn messy_inventory_data() -> Table {
    let mut rng = rand::thread_rng();
    let mut table = Table::new(vec!["ItemID", "ItemName", "StockLevel"]);
    for (idx, item) in INVENTORY_ITEMS.iter().enumerate() {
        for _ in 0..rng.gen_range(2..=5) {
            table.push(vec![
                format!("ITEM-{idx:02}"),
                item.to_string(),
                rng.gen_range(0..=200).to_string(),
            ]);
        }
    }
    table
}

pub fn student_scores() -> Table {
    let mut rng = rand::thread_rng();
    let mut table = Table::new(vec!["StudentID", "Score"]);
    for i in 1..=30 {
        table.push(vec![
            format!("Student_{i:02}"),
            rng.gen_range(40..=100).to_string(),
        ]);
    }
    table
}

pub fn project_data() -> Table {
    let mut rng = rand::thread_rng();
    let mut table = Table::new(vec!["ProjectID", "Status", "Budget"]);
    for i in 0..40 {
        table.push(vec![
            format!("PROJ-{i:03}"),
            pick(&mut rng, &PROJECT_STATUSES),
            rng.gen_range(10_000..=50_000).to_string(),
        ]);
    }
    table
}

pub fn contact_list() -> Table {
    let mut rng = rand::thread_rng();
    let mut table = Table::new(vec!["FirstName", "LastName"]);
    for _ in 0..20 {
        table.push(vec![
            pick(&mut rng, &FIRST_NAMES),
            pick(&mut rng, &LAST_NAMES),
        ]);
    }
    table
}

/// Orders whose `Price` column is text such as `$ 1.50`.
pub fn order_data() -> Table {
    let mut rng = rand::thread_rng();
    let mut table = Table::new(vec!["Product", "Price"]);
    for _ in 0..60 {
        table.push(vec![
            pick(&mut rng, &FRUITS),
            format!("$ {:.2}", rng.gen_range(0.5..3.0)),
        ]);
    }
    table
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_to_csv_quotes_fields_with_delimiters() {
        let mut table = Table::new(vec!["Name", "Note"]);
        table.push(vec!["Doe, Jane".to_string(), "said \"hi\"".to_string()]);
        assert_eq!(
            table.to_csv(),
            "Name,Note\n\"Doe, Jane\",\"said \"\"hi\"\"\"\n"
        );
    }

    #[test]
    fn test_sales_data_shape_and_ranges() {
        let table = sales_data();
        assert_eq!(table.rows.len(), 50);
        for units in table.values("Units Sold") {
            let units: u32 = units.parse().unwrap();
            assert!((5..=50).contains(&units));
        }
        for price in table.values("Price per Unit") {
            let price: u32 = price.parse().unwrap();
            assert!((800..=15000).contains(&price));
        }
        for date in table.values("Date") {
            let date = NaiveDate::parse_from_str(date, "%Y-%m-%d").unwrap();
            assert!(date >= NaiveDate::from_ymd_opt(2025, 1, 1).unwrap());
            assert!(date <= NaiveDate::from_ymd_opt(2025, 7, 20).unwrap());
        }
    }

    #[test]
    fn test_employee_ids_are_sequential() {
        let table = employee_data();
        let ids: Vec<&str> = table.values("Employee ID").collect();
        assert_eq!(ids.len(), 50);
        assert_eq!(ids[0], "EMP-001");
        assert_eq!(ids[32], "EMP-033");
        assert_eq!(ids[49], "EMP-050");
    }

    #[test]
    fn test_messy_inventory_contains_duplicates() {
        let table = messy_inventory_data();
        let ids: Vec<&str> = table.values("ItemID").collect();
        let unique: HashSet<&str> = ids.iter().copied().collect();
        assert_eq!(unique.len(), 4);
        assert!(ids.len() >= 8 && ids.len() <= 20);
    }

    #[test]
    fn test_order_prices_are_text_with_currency() {
        let table = order_data();
        assert_eq!(table.rows.len(), 60);
        assert!(table.values("Price").all(|p| p.starts_with("$ ")));
    }

    #[test]
    fn test_values_of_unknown_column_is_empty() {
        let table = student_scores();
        assert_eq!(table.values("Nope").count(), 0);
    }

    #[tokio::test]
    async fn test_csv_store_yields_fresh_reference_each_call() {
        let dir = tempfile::tempdir().unwrap();
        let store = CsvDatasetStore::new(dir.path().join("data")).unwrap();
        let table = contact_list();

        let first = store.provide("task_5", &table).await.unwrap();
        let second = store.provide("task_5", &table).await.unwrap();

        assert_ne!(first, second);
        let written = std::fs::read_to_string(first.path()).unwrap();
        assert!(written.starts_with("FirstName,LastName\n"));
        assert_eq!(written.lines().count(), 21);
    }

    #[tokio::test]
    async fn test_csv_store_discard_removes_only_that_file() {
        let dir = tempfile::tempdir().unwrap();
        let store = CsvDatasetStore::new(dir.path()).unwrap();
        let table = student_scores();

        let kept = store.provide("task_4", &table).await.unwrap();
        let dropped = store.provide("task_4", &table).await.unwrap();
        store.discard(&dropped).await.unwrap();

        assert!(!dropped.path().exists());
        assert!(kept.path().exists());

        // Discarding twice is harmless.
        store.discard(&dropped).await.unwrap();
    }
}
