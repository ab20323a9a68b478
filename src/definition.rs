//! Reading definition books: one spreadsheet sheet per declared source, one
//! metadata entry per row.
//!
//! The reader is written once and parameterized by the entry shape through
//! [`MetadataEntry`]. A source's identity key comes from its [`KeyLayout`]
//! (bare table name, or `table.column`), lower-cased so lookups ignore case.
//! Cell positions are absolute sheet positions: column `A` is position 0 even
//! when the used area of the sheet starts further right.

use std::{ops::Range, path::Path};

use calamine::{Data, Reader, open_workbook_auto};
use log::debug;

use crate::{
    cell_ref::{self, column_index},
    config::{ColumnSource, TableSource},
    error::{AnnotateError, Result},
    index::MetadataIndex,
};

/// Row-addressable text cells.
pub trait CellGrid {
    /// Absolute row numbers to visit, in sheet order.
    fn rows(&self) -> Range<u32>;
    /// Text of the cell at an absolute position; `""` when the cell is absent.
    fn cell_text(&self, row: u32, column: usize) -> String;
}

impl CellGrid for calamine::Range<Data> {
    fn rows(&self) -> Range<u32> {
        match (self.start(), self.end()) {
            (Some(start), Some(end)) => start.0..end.0 + 1,
            _ => 0..0,
        }
    }

    fn cell_text(&self, row: u32, column: usize) -> String {
        u32::try_from(column)
            .ok()
            .and_then(|col| self.get_value((row, col)))
            .map(|value| match value {
                Data::Bool(true) => "TRUE".to_string(),
                Data::Bool(false) => "FALSE".to_string(),
                other => other.to_string(),
            })
            .unwrap_or_default()
    }
}

/// Where the identity of a row lives.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyLayout {
    Table { name: usize },
    Column { table: usize, name: usize },
}

impl KeyLayout {
    pub fn key<G: CellGrid + ?Sized>(&self, grid: &G, row: u32) -> String {
        match *self {
            KeyLayout::Table { name } => grid.cell_text(row, name).to_lowercase(),
            KeyLayout::Column { table, name } => column_key(
                &grid.cell_text(row, table).to_lowercase(),
                &grid.cell_text(row, name),
            ),
        }
    }
}

/// `<table>.<column>` with the column part lower-cased. The table part is
/// expected to be lower-cased already (it is the carried table context while
/// rewriting).
pub fn column_key(table_key: &str, column: &str) -> String {
    format!("{table_key}.{}", column.to_lowercase())
}

/// Designators for the optional value roles of a declaration.
#[derive(Debug, Clone, Copy)]
pub struct Roles<'a> {
    pub alias: &'a str,
    pub description: &'a str,
    pub tags: &'a [String],
}

/// A declared book/sheet and the column roles needed to read it.
pub trait SourceDeclaration {
    fn book(&self) -> &Path;
    fn sheet(&self) -> &str;
    /// Resolves the identity columns; fails when a required designator is
    /// unresolvable.
    fn key_layout(&self) -> Result<KeyLayout>;
    fn roles(&self) -> Roles<'_>;
}

fn required<S>(source: &S, role: &'static str, designator: &str) -> Result<usize>
where
    S: SourceDeclaration + ?Sized,
{
    column_index(designator).ok_or_else(|| AnnotateError::Config {
        role,
        designator: designator.to_string(),
        book: source.book().to_path_buf(),
        sheet: source.sheet().to_string(),
    })
}

impl SourceDeclaration for TableSource {
    fn book(&self) -> &Path {
        &self.book
    }

    fn sheet(&self) -> &str {
        &self.sheet
    }

    fn key_layout(&self) -> Result<KeyLayout> {
        let name = required(self, "name", &self.name)?;
        Ok(KeyLayout::Table { name })
    }

    fn roles(&self) -> Roles<'_> {
        Roles {
            alias: &self.alias,
            description: &self.description,
            tags: &self.tags,
        }
    }
}

impl SourceDeclaration for ColumnSource {
    fn book(&self) -> &Path {
        &self.book
    }

    fn sheet(&self) -> &str {
        &self.sheet
    }

    fn key_layout(&self) -> Result<KeyLayout> {
        let table = required(self, "table", &self.table)?;
        let name = required(self, "name", &self.name)?;
        Ok(KeyLayout::Column { table, name })
    }

    fn roles(&self) -> Roles<'_> {
        Roles {
            alias: &self.alias,
            description: &self.description,
            tags: &self.tags,
        }
    }
}

/// Value extracted from one definition row.
pub trait MetadataEntry: Sized {
    /// Resolved value columns for one declaration.
    type Columns;

    /// `None` when the declaration has nothing to contribute for this shape.
    fn columns(roles: &Roles<'_>) -> Option<Self::Columns>;

    fn extract<G: CellGrid + ?Sized>(columns: &Self::Columns, grid: &G, row: u32) -> Self;
}

/// Alias and description of a table or column.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EnrichmentEntry {
    pub alias: String,
    pub description: String,
}

#[derive(Debug, Clone, Copy)]
pub struct EnrichmentColumns {
    alias: Option<usize>,
    description: Option<usize>,
}

impl MetadataEntry for EnrichmentEntry {
    type Columns = EnrichmentColumns;

    fn columns(roles: &Roles<'_>) -> Option<EnrichmentColumns> {
        Some(EnrichmentColumns {
            alias: column_index(roles.alias),
            description: column_index(roles.description),
        })
    }

    fn extract<G: CellGrid + ?Sized>(columns: &EnrichmentColumns, grid: &G, row: u32) -> Self {
        let read = |column: Option<usize>| {
            column
                .map(|col| grid.cell_text(row, col))
                .unwrap_or_default()
        };
        EnrichmentEntry {
            alias: read(columns.alias),
            description: read(columns.description),
        }
    }
}

/// Tag values of a table or column, in declared tag-column order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TagEntry {
    pub tags: Vec<String>,
}

impl MetadataEntry for TagEntry {
    type Columns = Vec<usize>;

    fn columns(roles: &Roles<'_>) -> Option<Vec<usize>> {
        let columns: Vec<usize> = roles
            .tags
            .iter()
            .filter_map(|designator| column_index(designator))
            .collect();
        (!columns.is_empty()).then_some(columns)
    }

    fn extract<G: CellGrid + ?Sized>(columns: &Vec<usize>, grid: &G, row: u32) -> Self {
        TagEntry {
            tags: columns.iter().map(|&col| grid.cell_text(row, col)).collect(),
        }
    }
}

/// Inserts one entry per grid row; later rows replace earlier ones with the
/// same key. Returns the number of rows visited.
pub fn read_grid<G, E>(
    grid: &G,
    layout: KeyLayout,
    columns: &E::Columns,
    index: &mut MetadataIndex<E>,
) -> usize
where
    G: CellGrid + ?Sized,
    E: MetadataEntry,
{
    let mut visited = 0;
    for row in grid.rows() {
        let key = layout.key(grid, row);
        index.insert(key, E::extract(columns, grid, row));
        visited += 1;
    }
    visited
}

/// Reads every row of one declared source into `index`.
///
/// Designators are validated before the book is opened, and a declaration with
/// nothing to contribute for this entry shape never opens its book.
pub fn read_source<S, E>(source: &S, index: &mut MetadataIndex<E>) -> Result<usize>
where
    S: SourceDeclaration + ?Sized,
    E: MetadataEntry,
{
    let layout = source.key_layout()?;
    let Some(columns) = E::columns(&source.roles()) else {
        debug!(
            "Skipping {:?} sheet '{}': no resolvable tag columns",
            source.book(),
            source.sheet()
        );
        return Ok(0);
    };
    debug!(
        "Reading {:?} sheet '{}' keyed by {}",
        source.book(),
        source.sheet(),
        describe_layout(layout)
    );
    let grid = open_sheet(source.book(), source.sheet())?;
    Ok(read_grid(&grid, layout, &columns, index))
}

/// Loads a whole sheet. The workbook handle is released before returning.
pub fn open_sheet(book: &Path, sheet: &str) -> Result<calamine::Range<Data>> {
    let unavailable = |reason: String| AnnotateError::SourceNotFound {
        book: book.to_path_buf(),
        reason,
    };
    let mut workbook = open_workbook_auto(book).map_err(|err| unavailable(err.to_string()))?;
    if !workbook.sheet_names().iter().any(|name| name == sheet) {
        return Err(unavailable(format!("sheet '{sheet}' not found")));
    }
    workbook
        .worksheet_range(sheet)
        .map_err(|err| unavailable(err.to_string()))
}

fn describe_layout(layout: KeyLayout) -> String {
    match layout {
        KeyLayout::Table { name } => format!("name column {}", cell_ref::column_name(name)),
        KeyLayout::Column { table, name } => format!(
            "table column {} and name column {}",
            cell_ref::column_name(table),
            cell_ref::column_name(name)
        ),
    }
}
