mod checkpoint;
mod fasta;

pub use checkpoint::{read_records, write_records, Checkpoints};
pub use fasta::{read_fasta, write_fasta};

use std::fmt;
use std::str::FromStr;

///////////////////////////////
/// On-disk encoding of stage checkpoints
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StageFormat {
    /// One record per line in the textual wire format
    Text,
    /// bincode: a record count followed by the records
    Binary,
}

impl StageFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            StageFormat::Text => "txt",
            StageFormat::Binary => "bin",
        }
    }
}

impl FromStr for StageFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" | "txt" => Ok(StageFormat::Text),
            "binary" | "bin" => Ok(StageFormat::Binary),
            _ => Err(format!("Invalid stage format: {}. Use text or binary", s)),
        }
    }
}

impl fmt::Display for StageFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StageFormat::Text => write!(f, "text"),
            StageFormat::Binary => write!(f, "binary"),
        }
    }
}
