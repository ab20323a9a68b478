//! Streaming rewrite of exported definition records.
//!
//! Records arrive in export order: a table record followed by the column
//! records that belong to it. The only state carried between records is the
//! [`TableContext`], the key of the most recent table record, which column
//! records combine with their own name to build `table.column` keys.
//!
//! | kind | variant    | min fields | rewritten          |
//! |------|------------|------------|--------------------|
//! | `20` | enrichment | 7          | alias, description |
//! | `30` | enrichment | 8          | alias, description |
//! | `41` | tag        | 4 + tags   | trailing tag block |
//! | `42` | tag        | 4 + tags   | trailing tag block |
//!
//! Records stay raw bytes. Editors look at the kind and, when a lookup is
//! needed, the decoded name field; everything they do not rewrite is written
//! back byte for byte, whatever its encoding.

use std::{
    borrow::Cow,
    io::{Read, Write},
    path::Path,
};

use csv::ByteRecord;
use encoding_rs::Encoding;
use log::debug;

use crate::{
    definition::{EnrichmentEntry, TagEntry, column_key},
    error::{AnnotateError, Result},
    index::{EnrichmentIndex, TagIndex},
    io_utils::{self, Transcoder},
};

pub const TABLE_RECORD: &[u8] = b"20";
pub const COLUMN_RECORD: &[u8] = b"30";
pub const TABLE_TAG_RECORD: &[u8] = b"41";
pub const COLUMN_TAG_RECORD: &[u8] = b"42";

const NAME_FIELD: usize = 2;
const ALIAS_FIELD: usize = 3;
const TABLE_MIN_FIELDS: usize = 7;
const COLUMN_MIN_FIELDS: usize = 8;
const TAG_OFFSET: usize = 4;

/// Key of the table whose column records are currently being read.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TableContext {
    current: String,
}

impl TableContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current(&self) -> &str {
        &self.current
    }

    fn enter(&mut self, table_key: String) {
        self.current = table_key;
    }
}

/// Read-only view of one raw record.
#[derive(Debug, Clone, Copy)]
pub struct RecordView<'r> {
    raw: &'r ByteRecord,
    encoding: &'static Encoding,
}

impl<'r> RecordView<'r> {
    pub fn new(raw: &'r ByteRecord, encoding: &'static Encoding) -> Self {
        Self { raw, encoding }
    }

    pub fn kind(&self) -> Option<&'r [u8]> {
        self.raw.get(0)
    }

    pub fn len(&self) -> usize {
        self.raw.len()
    }

    pub fn is_empty(&self) -> bool {
        self.raw.is_empty()
    }

    /// Decoded name field, for key building.
    fn name(&self) -> Cow<'r, str> {
        io_utils::decode_field(self.raw.get(NAME_FIELD).unwrap_or_default(), self.encoding)
    }
}

/// Replacement text for a run of consecutive fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Patch<'a> {
    first: usize,
    values: Vec<&'a str>,
}

impl<'a> Patch<'a> {
    pub fn get(&self, field: usize) -> Option<&'a str> {
        field
            .checked_sub(self.first)
            .and_then(|offset| self.values.get(offset).copied())
    }
}

/// What happens to a single record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Edit<'a> {
    Rewritten(Patch<'a>),
    /// Enrichable kind, but its key is not in the index.
    Unmatched,
    /// Key found, but the tag block width differs from the entry's tag count.
    WidthMismatch,
    PassThrough,
}

/// Per-record decision. Field count never changes.
pub trait RecordEditor {
    fn edit<'s>(&'s self, record: &RecordView<'_>, context: &mut TableContext) -> Edit<'s>;
}

/// Fills alias and description of table (`20`) and column (`30`) records.
#[derive(Debug, Clone, Copy)]
pub struct EnrichmentEditor<'a> {
    tables: &'a EnrichmentIndex,
    columns: &'a EnrichmentIndex,
}

impl<'a> EnrichmentEditor<'a> {
    pub fn new(tables: &'a EnrichmentIndex, columns: &'a EnrichmentIndex) -> Self {
        Self { tables, columns }
    }
}

fn enrichment_patch(entry: &EnrichmentEntry) -> Edit<'_> {
    Edit::Rewritten(Patch {
        first: ALIAS_FIELD,
        values: vec![entry.alias.as_str(), entry.description.as_str()],
    })
}

impl RecordEditor for EnrichmentEditor<'_> {
    fn edit<'s>(&'s self, record: &RecordView<'_>, context: &mut TableContext) -> Edit<'s> {
        match record.kind() {
            Some(TABLE_RECORD) => {
                if record.len() < TABLE_MIN_FIELDS {
                    return Edit::PassThrough;
                }
                let key = record.name().to_lowercase();
                let found = self.tables.get(&key);
                context.enter(key);
                found.map_or(Edit::Unmatched, enrichment_patch)
            }
            Some(COLUMN_RECORD) => {
                if record.len() < COLUMN_MIN_FIELDS {
                    return Edit::PassThrough;
                }
                let key = column_key(context.current(), &record.name());
                self.columns
                    .get(&key)
                    .map_or(Edit::Unmatched, enrichment_patch)
            }
            _ => Edit::PassThrough,
        }
    }
}

/// Replaces the trailing tag block of table (`41`) and column (`42`) records.
#[derive(Debug, Clone, Copy)]
pub struct TagEditor<'a> {
    tables: &'a TagIndex,
    columns: &'a TagIndex,
}

impl<'a> TagEditor<'a> {
    pub fn new(tables: &'a TagIndex, columns: &'a TagIndex) -> Self {
        Self { tables, columns }
    }
}

fn tag_patch<'s>(record: &RecordView<'_>, entry: &'s TagEntry) -> Edit<'s> {
    if record.len() != TAG_OFFSET + entry.tags.len() {
        return Edit::WidthMismatch;
    }
    Edit::Rewritten(Patch {
        first: TAG_OFFSET,
        values: entry.tags.iter().map(String::as_str).collect(),
    })
}

impl RecordEditor for TagEditor<'_> {
    fn edit<'s>(&'s self, record: &RecordView<'_>, context: &mut TableContext) -> Edit<'s> {
        match record.kind() {
            Some(TABLE_TAG_RECORD) => {
                if record.len() < TAG_OFFSET {
                    return Edit::PassThrough;
                }
                let key = record.name().to_lowercase();
                let found = self.tables.get(&key);
                context.enter(key);
                found.map_or(Edit::Unmatched, |entry| tag_patch(record, entry))
            }
            Some(COLUMN_TAG_RECORD) => {
                if record.len() < TAG_OFFSET {
                    return Edit::PassThrough;
                }
                let key = column_key(context.current(), &record.name());
                self.columns
                    .get(&key)
                    .map_or(Edit::Unmatched, |entry| tag_patch(record, entry))
            }
            _ => Edit::PassThrough,
        }
    }
}

/// Counts of each [`Edit`] outcome over one stream.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RewriteStats {
    pub records: u64,
    pub rewritten: u64,
    pub unmatched: u64,
    pub width_mismatch: u64,
    pub passed_through: u64,
}

impl RewriteStats {
    fn tally(&mut self, edit: &Edit<'_>) {
        self.records += 1;
        match edit {
            Edit::Rewritten(_) => self.rewritten += 1,
            Edit::Unmatched => self.unmatched += 1,
            Edit::WidthMismatch => self.width_mismatch += 1,
            Edit::PassThrough => self.passed_through += 1,
        }
    }
}

/// Builds the output form of `raw` into `out`, replacing patched fields and
/// transcoding the rest. `None` when a patched value cannot be encoded.
pub fn render(
    raw: &ByteRecord,
    patch: Option<&Patch<'_>>,
    transcoder: &Transcoder,
    out: &mut ByteRecord,
) -> Option<()> {
    out.clear();
    for (position, field) in raw.iter().enumerate() {
        match patch.and_then(|patch| patch.get(position)) {
            Some(text) => out.push_field(&transcoder.text(text)?),
            None => out.push_field(&transcoder.field(field)),
        }
    }
    Some(())
}

/// Reads every record from `reader`, edits it and writes it to `writer` in
/// the same order, then flushes. `input` and `output` name the streams in
/// errors.
pub fn rewrite_records<R, W, E>(
    reader: &mut csv::Reader<R>,
    writer: &mut csv::Writer<W>,
    editor: &E,
    transcoder: Transcoder,
    input: &Path,
    output: &Path,
) -> Result<RewriteStats>
where
    R: Read,
    W: Write,
    E: RecordEditor + ?Sized,
{
    let mut context = TableContext::new();
    let mut stats = RewriteStats::default();
    let mut raw = ByteRecord::new();
    let mut rendered = ByteRecord::new();
    let write_failed = |source: csv::Error| AnnotateError::Csv {
        path: output.to_path_buf(),
        source,
    };
    loop {
        let more = reader
            .read_byte_record(&mut raw)
            .map_err(|source| AnnotateError::Csv {
                path: input.to_path_buf(),
                source,
            })?;
        if !more {
            break;
        }
        let line = raw.position().map_or(0, |pos| pos.line());
        let edit = editor.edit(&RecordView::new(&raw, transcoder.input()), &mut context);
        stats.tally(&edit);
        let patch = match &edit {
            Edit::Rewritten(patch) => Some(patch),
            Edit::WidthMismatch => {
                debug!(
                    "Tag block width mismatch on line {line} ({} field(s))",
                    raw.len()
                );
                None
            }
            _ => None,
        };
        if patch.is_none() && transcoder.is_identity() {
            writer.write_byte_record(&raw).map_err(write_failed)?;
            continue;
        }
        render(&raw, patch, &transcoder, &mut rendered).ok_or_else(|| AnnotateError::Encode {
            path: input.to_path_buf(),
            line,
            encoding: transcoder.output().name(),
        })?;
        writer.write_byte_record(&rendered).map_err(write_failed)?;
    }
    writer.flush().map_err(|source| AnnotateError::Io {
        path: output.to_path_buf(),
        source,
    })?;
    Ok(stats)
}
