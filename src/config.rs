//! JSON run configuration: record files, output encoding and the definition
//! books to read.
//!
//! ```json
//! {
//!   "tag": false,
//!   "input": "export.csv",
//!   "output": "import.csv",
//!   "tables":  [{ "book": "tables.xlsx", "sheet": "Tables", "name": "B", "alias": "C", "description": "D" }],
//!   "columns": [{ "book": "columns.xlsx", "sheet": "Columns", "table": "A", "name": "B", "alias": "C", "description": "E" }]
//! }
//! ```

use std::{
    fs::File,
    io::BufReader,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Settings {
    /// Selects the tag-enrichment variant instead of alias/description.
    #[serde(default)]
    pub tag: bool,
    pub input: PathBuf,
    pub output: PathBuf,
    #[serde(default)]
    pub tables: Vec<TableSource>,
    #[serde(default)]
    pub columns: Vec<ColumnSource>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub input_encoding: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output_encoding: Option<String>,
}

impl Settings {
    pub fn load(path: &Path) -> Result<Self> {
        let file = File::open(path).with_context(|| format!("Opening settings file {path:?}"))?;
        let reader = BufReader::new(file);
        let settings = serde_json::from_reader(reader)
            .with_context(|| format!("Parsing settings JSON {path:?}"))?;
        Ok(settings)
    }
}

/// A book/sheet holding one table definition per row.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TableSource {
    pub book: PathBuf,
    pub sheet: String,
    pub name: String,
    #[serde(default)]
    pub alias: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub tags: Vec<String>,
}

/// A book/sheet holding one column definition per row, each naming its table.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ColumnSource {
    pub book: PathBuf,
    pub sheet: String,
    pub table: String,
    pub name: String,
    #[serde(default)]
    pub alias: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub tags: Vec<String>,
}
