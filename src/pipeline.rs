use anyhow::{Context, Result};
use encoding_rs::Encoding;
use log::info;

use crate::{
    config::Settings,
    index::{EnrichmentIndex, TagIndex},
    io_utils::{self, Transcoder},
    rewrite::{self, EnrichmentEditor, RecordEditor, RewriteStats, TagEditor},
};

/// Which enrichment runs over the whole stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Alias and description on `20`/`30` records.
    Enrichment,
    /// Tag blocks on `41`/`42` records.
    Tag,
}

impl Mode {
    pub fn from_settings(settings: &Settings) -> Self {
        if settings.tag { Mode::Tag } else { Mode::Enrichment }
    }
}

/// Builds both indices for the selected mode, then rewrites the input file
/// into the output file.
pub fn execute(settings: &Settings) -> Result<RewriteStats> {
    let input_encoding = io_utils::resolve_encoding(settings.input_encoding.as_deref())?;
    let output_encoding = io_utils::resolve_encoding(settings.output_encoding.as_deref())?;
    let mode = Mode::from_settings(settings);
    info!(
        "Annotating {:?} -> {:?} ({:?} mode, {} table source(s), {} column source(s))",
        settings.input,
        settings.output,
        mode,
        settings.tables.len(),
        settings.columns.len()
    );

    match mode {
        Mode::Enrichment => {
            let tables =
                EnrichmentIndex::build(&settings.tables).context("Building table index")?;
            let columns =
                EnrichmentIndex::build(&settings.columns).context("Building column index")?;
            info!(
                "Indexed {} table(s) and {} column(s)",
                tables.len(),
                columns.len()
            );
            let editor = EnrichmentEditor::new(&tables, &columns);
            rewrite_file(settings, &editor, input_encoding, output_encoding)
        }
        Mode::Tag => {
            let tables = TagIndex::build(&settings.tables).context("Building table tag index")?;
            let columns =
                TagIndex::build(&settings.columns).context("Building column tag index")?;
            info!(
                "Indexed tags for {} table(s) and {} column(s)",
                tables.len(),
                columns.len()
            );
            let editor = TagEditor::new(&tables, &columns);
            rewrite_file(settings, &editor, input_encoding, output_encoding)
        }
    }
}

fn rewrite_file<E: RecordEditor>(
    settings: &Settings,
    editor: &E,
    input_encoding: &'static Encoding,
    output_encoding: &'static Encoding,
) -> Result<RewriteStats> {
    let mut reader = io_utils::open_record_reader(&settings.input)?;
    let mut writer = io_utils::open_record_writer(&settings.output)?;
    let stats = rewrite::rewrite_records(
        &mut reader,
        &mut writer,
        editor,
        Transcoder::new(input_encoding, output_encoding),
        &settings.input,
        &settings.output,
    )
    .with_context(|| format!("Rewriting {:?}", settings.input))?;
    Ok(stats)
}
