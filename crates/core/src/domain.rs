use chrono::{DateTime, NaiveDate, Utc};
use std::fmt;

/// Catalog entry loaded into the `products` table
#[derive(Debug, Clone, PartialEq)]
pub struct Product {
    pub product_id: String,
    pub title: String,
    pub price: f64,
    pub category: String,
    pub rating: f64,
    pub reviews_count: u32,
}

/// Customer review loaded into the `reviews` table.
/// `product_id` points at a `Product` by convention only.
#[derive(Debug, Clone, PartialEq)]
pub struct Review {
    pub review_id: String,
    pub product_id: String,
    pub rating: u8,
    pub review_text: String,
    pub reviewer_name: String,
    pub review_date: NaiveDate,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataType {
    Text,
    Double,
    BigInt,
    Date,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Text(String),
    Double(f64),
    BigInt(i64),
    Date(NaiveDate),
}

/// Table column; every column is written as NOT NULL
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Column {
    pub name: &'static str,
    pub data_type: DataType,
}

impl Column {
    pub const fn new(name: &'static str, data_type: DataType) -> Self {
        Self { name, data_type }
    }
}

/// Ordered column layout of one destination table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableSchema {
    pub columns: Vec<Column>,
}

impl TableSchema {
    pub fn new(columns: Vec<Column>) -> Self {
        Self { columns }
    }

    pub fn column_names(&self) -> Vec<&'static str> {
        self.columns.iter().map(|c| c.name).collect()
    }
}

/// A typed row that knows its table layout
pub trait Record {
    fn schema() -> TableSchema;

    /// Values in the same order as `schema().columns`
    fn to_row(&self) -> Vec<Value>;
}

impl Record for Product {
    fn schema() -> TableSchema {
        TableSchema::new(vec![
            Column::new("product_id", DataType::Text),
            Column::new("title", DataType::Text),
            Column::new("price", DataType::Double),
            Column::new("category", DataType::Text),
            Column::new("rating", DataType::Double),
            Column::new("reviews_count", DataType::BigInt),
        ])
    }

    fn to_row(&self) -> Vec<Value> {
        vec![
            Value::Text(self.product_id.clone()),
            Value::Text(self.title.clone()),
            Value::Double(self.price),
            Value::Text(self.category.clone()),
            Value::Double(self.rating),
            Value::BigInt(i64::from(self.reviews_count)),
        ]
    }
}

impl Record for Review {
    fn schema() -> TableSchema {
        TableSchema::new(vec![
            Column::new("review_id", DataType::Text),
            Column::new("product_id", DataType::Text),
            Column::new("rating", DataType::BigInt),
            Column::new("review_text", DataType::Text),
            Column::new("reviewer_name", DataType::Text),
            Column::new("review_date", DataType::Date),
        ])
    }

    fn to_row(&self) -> Vec<Value> {
        vec![
            Value::Text(self.review_id.clone()),
            Value::Text(self.product_id.clone()),
            Value::BigInt(i64::from(self.rating)),
            Value::Text(self.review_text.clone()),
            Value::Text(self.reviewer_name.clone()),
            Value::Date(self.review_date),
        ]
    }
}

/// The single batch a provider hands over for one table
#[derive(Debug, Clone, PartialEq)]
pub struct TableBatch {
    pub table: String,
    pub schema: TableSchema,
    pub rows: Vec<Vec<Value>>,
}

impl TableBatch {
    pub fn from_records<R: Record>(table: impl Into<String>, records: &[R]) -> Self {
        Self {
            table: table.into(),
            schema: R::schema(),
            rows: records.iter().map(R::to_row).collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    NotStarted,
    Completed,
    Failed,
}

/// Outcome of writing one table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableLoad {
    pub table: String,
    pub row_count: usize,
}

/// Summary of a completed load.
/// A failed run returns its error instead, so every `LoadInfo` describes
/// a load with no failed jobs.
#[derive(Debug, Clone)]
pub struct LoadInfo {
    pub pipeline_name: String,
    pub destination_name: String,
    pub destination_location: String,
    pub dataset_name: String,
    pub load_id: String,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub tables: Vec<TableLoad>,
}

impl LoadInfo {
    pub fn table_count(&self) -> usize {
        self.tables.len()
    }

    pub fn total_rows(&self) -> usize {
        self.tables.iter().map(|t| t.row_count).sum()
    }

    pub fn failed_jobs(&self) -> usize {
        0
    }
}

impl fmt::Display for LoadInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let elapsed = (self.finished_at - self.started_at)
            .to_std()
            .unwrap_or_default();
        writeln!(
            f,
            "Pipeline {} load step completed in {:.2?}",
            self.pipeline_name, elapsed
        )?;
        writeln!(
            f,
            "1 load package(s) were loaded to destination {} and into dataset {}",
            self.destination_name, self.dataset_name
        )?;
        writeln!(
            f,
            "The {} destination used {} location to store data",
            self.destination_name, self.destination_location
        )?;
        writeln!(
            f,
            "Load package {} is LOADED and contains no failed jobs",
            self.load_id
        )?;
        for table in &self.tables {
            writeln!(f, "  {}: {} row(s), replace", table.table, table.row_count)?;
        }
        write!(
            f,
            "{} table(s), {} row(s) in total",
            self.table_count(),
            self.total_rows()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn sample_review() -> Review {
        Review {
            review_id: "R1".to_string(),
            product_id: "P1".to_string(),
            rating: 3,
            review_text: "ok".to_string(),
            reviewer_name: "A.".to_string(),
            review_date: NaiveDate::from_ymd_opt(2024, 2, 29).unwrap(),
        }
    }

    #[test]
    fn test_row_matches_schema_width() {
        let review = sample_review();
        assert_eq!(review.to_row().len(), Review::schema().columns.len());
    }

    #[test]
    fn test_review_row_keeps_date_typed() {
        let row = sample_review().to_row();
        assert_eq!(
            row[5],
            Value::Date(NaiveDate::from_ymd_opt(2024, 2, 29).unwrap())
        );
        assert_eq!(row[2], Value::BigInt(3));
    }

    #[test]
    fn test_batch_from_records() {
        let batch = TableBatch::from_records("reviews", &[sample_review(), sample_review()]);
        assert_eq!(batch.table, "reviews");
        assert_eq!(batch.len(), 2);
        assert!(!batch.is_empty());
        assert_eq!(batch.schema.column_names()[0], "review_id");
    }

    #[test]
    fn test_load_info_totals_and_display() {
        let started = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let info = LoadInfo {
            pipeline_name: "p".to_string(),
            destination_name: "sqlite".to_string(),
            destination_location: ":memory:".to_string(),
            dataset_name: "ds".to_string(),
            load_id: "1704067200.000000".to_string(),
            started_at: started,
            finished_at: started,
            tables: vec![
                TableLoad {
                    table: "a".to_string(),
                    row_count: 2,
                },
                TableLoad {
                    table: "b".to_string(),
                    row_count: 5,
                },
            ],
        };

        assert_eq!(info.table_count(), 2);
        assert_eq!(info.total_rows(), 7);
        assert_eq!(info.failed_jobs(), 0);

        let text = info.to_string();
        assert!(text.contains("destination sqlite and into dataset ds"));
        assert!(text.contains("Load package 1704067200.000000 is LOADED"));
        assert!(text.contains("  a: 2 row(s), replace"));
        assert!(text.ends_with("2 table(s), 7 row(s) in total"));
    }
}
