use std::path::PathBuf;

use clap::Parser;

use crate::config::Settings;

#[derive(Debug, Parser)]
#[command(
    author,
    version,
    about = "Fill aliases, descriptions and tags of exported CSV definitions from spreadsheet books",
    long_about = None
)]
pub struct Cli {
    /// JSON settings file naming the record files and definition books
    pub config: PathBuf,
    /// Input CSV file, overriding `input` in the settings ('-' for stdin)
    #[arg(short = 'i', long = "input")]
    pub input: Option<PathBuf>,
    /// Output CSV file, overriding `output` in the settings ('-' for stdout)
    #[arg(short = 'o', long = "output")]
    pub output: Option<PathBuf>,
    /// Rewrite tag blocks (41/42 records) instead of aliases and descriptions
    #[arg(long)]
    pub tag: bool,
    /// Character encoding of the input file (defaults to utf-8)
    #[arg(long = "input-encoding")]
    pub input_encoding: Option<String>,
    /// Character encoding for the output file (defaults to utf-8)
    #[arg(long = "output-encoding")]
    pub output_encoding: Option<String>,
}

impl Cli {
    /// Applies command-line overrides on top of loaded settings.
    pub fn apply(&self, settings: &mut Settings) {
        if let Some(input) = &self.input {
            settings.input = input.clone();
        }
        if let Some(output) = &self.output {
            settings.output = output.clone();
        }
        if self.tag {
            settings.tag = true;
        }
        if let Some(label) = &self.input_encoding {
            settings.input_encoding = Some(label.clone());
        }
        if let Some(label) = &self.output_encoding {
            settings.output_encoding = Some(label.clone());
        }
    }
}
