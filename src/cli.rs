use clap::Parser;
use std::path::PathBuf;

/// Command-line arguments for vsv
#[derive(Parser, Debug)]
#[command(version, about = "view [x] separated values")]
pub struct Args {
    /// File to load; standard input when omitted or given as "-"
    pub path: Option<PathBuf>,

    /// Separator for values
    #[arg(short = 'd', long = "delimiter", default_value = ",", conflicts_with_all = ["psql", "mysql"])]
    pub delimiter: char,

    /// Use tabs as the separator value
    #[arg(short = 't', long = "tabs", action, conflicts_with_all = ["psql", "mysql"])]
    pub tabs: bool,

    /// Parse the output of the psql cli (used as a pager)
    #[arg(short = 'p', long = "psql", action, conflicts_with = "mysql")]
    pub psql: bool,

    /// Parse the output of the mysql cli
    #[arg(short = 'm', long = "mysql", action)]
    pub mysql: bool,

    /// Only read this many records ("all" for no limit)
    #[arg(short = 'n', long = "count", default_value = "all", value_parser = parse_count)]
    pub count: usize,

    /// Specify that the file has no header row
    #[arg(long = "no-header", action)]
    pub no_header: bool,
}

fn parse_count(raw: &str) -> Result<usize, String> {
    if raw == "all" {
        return Ok(usize::MAX);
    }
    raw.parse()
        .map_err(|_| format!("invalid value given for count: {}", raw))
}

impl Args {
    /// The single-byte record delimiter. The csv reader splits on bytes, so
    /// anything that encodes to more than one UTF-8 byte is rejected.
    pub fn delimiter_byte(&self) -> Result<u8, String> {
        if self.tabs {
            return Ok(b'\t');
        }
        if !self.delimiter.is_ascii() {
            return Err(format!(
                "delimiter must be a single-byte character: {}",
                self.delimiter
            ));
        }
        Ok(self.delimiter as u8)
    }
}
