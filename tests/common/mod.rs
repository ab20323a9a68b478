#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};

use csv_annotate::config::{ColumnSource, Settings, TableSource};
use rust_xlsxwriter::Workbook;
use tempfile::{TempDir, tempdir};

/// Scratch directory helper that cleans up files automatically on drop.
pub struct TestWorkspace {
    temp_dir: TempDir,
}

impl TestWorkspace {
    /// Creates a fresh scratch directory for the current test case.
    pub fn new() -> Self {
        Self {
            temp_dir: tempdir().expect("temp dir"),
        }
    }

    /// Returns the root path for all files owned by this workspace.
    pub fn path(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Writes `contents` into a file under the workspace and returns the path.
    pub fn write(&self, name: &str, contents: &str) -> PathBuf {
        let path = self.temp_dir.path().join(name);
        fs::write(&path, contents).expect("write temp file contents");
        path
    }

    pub fn read(&self, name: &str) -> String {
        fs::read_to_string(self.temp_dir.path().join(name)).expect("read temp file")
    }

    /// Writes an .xlsx book with one sheet per `(name, rows)` pair. Blank
    /// strings leave the cell empty.
    pub fn write_book(&self, name: &str, sheets: &[(&str, &[&[&str]])]) -> PathBuf {
        let path = self.temp_dir.path().join(name);
        let mut workbook = Workbook::new();
        for (sheet_name, rows) in sheets {
            let worksheet = workbook.add_worksheet();
            worksheet.set_name(*sheet_name).expect("sheet name");
            for (r, row) in rows.iter().enumerate() {
                for (c, value) in row.iter().enumerate() {
                    if !value.is_empty() {
                        worksheet
                            .write_string(r as u32, c as u16, *value)
                            .expect("write cell");
                    }
                }
            }
        }
        workbook.save(&path).expect("save workbook");
        path
    }

    /// Saves `settings` as JSON under the workspace and returns the path.
    pub fn write_settings(&self, name: &str, settings: &Settings) -> PathBuf {
        let path = self.temp_dir.path().join(name);
        let file = fs::File::create(&path).expect("create settings file");
        serde_json::to_writer_pretty(file, settings).expect("write settings JSON");
        path
    }
}

pub fn table_source(book: &Path, sheet: &str, name: &str, alias: &str, description: &str) -> TableSource {
    TableSource {
        book: book.to_path_buf(),
        sheet: sheet.to_string(),
        name: name.to_string(),
        alias: alias.to_string(),
        description: description.to_string(),
        tags: Vec::new(),
    }
}

pub fn column_source(
    book: &Path,
    sheet: &str,
    table: &str,
    name: &str,
    alias: &str,
    description: &str,
) -> ColumnSource {
    ColumnSource {
        book: book.to_path_buf(),
        sheet: sheet.to_string(),
        table: table.to_string(),
        name: name.to_string(),
        alias: alias.to_string(),
        description: description.to_string(),
        tags: Vec::new(),
    }
}
