//! Record file I/O: reader/writer construction, encodings and the `-`
//! convention for stdin/stdout.
//!
//! Record files are comma-delimited with a variable number of fields per
//! line; lines starting with `#` are comments and never reach the rewriter.
//! Records stay as raw bytes end to end. Only the fields needed for a lookup
//! are decoded, and fields are re-encoded only when the input and output
//! encodings differ.

use std::{
    borrow::Cow,
    fs::File,
    io::{self, BufReader, BufWriter, Read, Write},
    path::Path,
};

use anyhow::{Result, anyhow};
use csv::{QuoteStyle, Terminator};
use encoding_rs::{Encoding, UTF_8};

use crate::error::AnnotateError;

pub const RECORD_DELIMITER: u8 = b',';
pub const COMMENT_PREFIX: u8 = b'#';

pub fn is_dash(path: &Path) -> bool {
    path == Path::new("-")
}

pub fn resolve_encoding(label: Option<&str>) -> Result<&'static Encoding> {
    if let Some(value) = label {
        Encoding::for_label(value.trim().as_bytes())
            .ok_or_else(|| anyhow!("Unknown encoding '{value}'"))
    } else {
        Ok(UTF_8)
    }
}

pub fn record_reader<R: Read>(reader: R) -> csv::Reader<R> {
    csv::ReaderBuilder::new()
        .has_headers(false)
        .delimiter(RECORD_DELIMITER)
        .comment(Some(COMMENT_PREFIX))
        .double_quote(true)
        .flexible(true)
        .from_reader(reader)
}

pub fn open_record_reader(path: &Path) -> Result<csv::Reader<Box<dyn Read>>, AnnotateError> {
    let reader: Box<dyn Read> = if is_dash(path) {
        Box::new(io::stdin().lock())
    } else {
        let file = File::open(path).map_err(|source| AnnotateError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Box::new(BufReader::new(file))
    };
    Ok(record_reader(reader))
}

pub fn record_writer<W: Write>(writer: W) -> csv::Writer<W> {
    csv::WriterBuilder::new()
        .delimiter(RECORD_DELIMITER)
        .quote_style(QuoteStyle::Necessary)
        .terminator(Terminator::Any(b'\n'))
        .double_quote(true)
        .flexible(true)
        .from_writer(writer)
}

pub fn open_record_writer(path: &Path) -> Result<csv::Writer<Box<dyn Write>>, AnnotateError> {
    let writer: Box<dyn Write> = if is_dash(path) {
        Box::new(io::stdout())
    } else {
        let file = File::create(path).map_err(|source| AnnotateError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Box::new(BufWriter::new(file))
    };
    Ok(record_writer(writer))
}

/// Decodes one field for key comparison. Malformed sequences become U+FFFD
/// and a byte order mark is kept as data.
pub fn decode_field<'a>(field: &'a [u8], encoding: &'static Encoding) -> Cow<'a, str> {
    encoding.decode_without_bom_handling(field).0
}

/// Moves field bytes from the input encoding to the output encoding.
#[derive(Debug, Clone, Copy)]
pub struct Transcoder {
    input: &'static Encoding,
    output: &'static Encoding,
}

impl Transcoder {
    pub fn new(input: &'static Encoding, output: &'static Encoding) -> Self {
        Self { input, output }
    }

    pub fn input(&self) -> &'static Encoding {
        self.input
    }

    pub fn output(&self) -> &'static Encoding {
        self.output
    }

    /// True when input bytes can be written out as they are.
    pub fn is_identity(&self) -> bool {
        self.input == self.output
    }

    /// Re-encodes an input field. Bytes that are not valid in the input
    /// encoding, or not representable in the output encoding, are copied
    /// unchanged.
    pub fn field<'a>(&self, raw: &'a [u8]) -> Cow<'a, [u8]> {
        if self.is_identity() {
            return Cow::Borrowed(raw);
        }
        let Some(text) = self
            .input
            .decode_without_bom_handling_and_without_replacement(raw)
        else {
            return Cow::Borrowed(raw);
        };
        match self.text(&text) {
            Some(encoded) => Cow::Owned(encoded.into_owned()),
            None => Cow::Borrowed(raw),
        }
    }

    /// Encodes replacement text; `None` when it cannot be represented in the
    /// output encoding.
    pub fn text<'a>(&self, text: &'a str) -> Option<Cow<'a, [u8]>> {
        let (encoded, _, had_errors) = self.output.encode(text);
        (!had_errors).then_some(encoded)
    }
}
