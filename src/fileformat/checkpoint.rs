use std::fmt;
use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::str::FromStr;

use log::{debug, info};
use serde::de::DeserializeOwned;
use serde::Serialize;

use super::StageFormat;
use crate::runtime::{Error, Result};

/// Sibling path a file is written to before it is renamed into place
pub(super) fn partial_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().map(|n| n.to_os_string()).unwrap_or_default();
    name.push(".partial");
    path.with_file_name(name)
}

///////////////////////////////
/// Materialise a stage output. Readers never see a half-written checkpoint
pub fn write_records<T, P>(path: P, format: StageFormat, records: &[T]) -> Result<()>
where
    T: fmt::Display + Serialize,
    P: AsRef<Path>,
{
    let path = path.as_ref();
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let tmp = partial_path(path);
    {
        let mut writer = BufWriter::new(File::create(&tmp)?);
        match format {
            StageFormat::Text => {
                for record in records {
                    writeln!(writer, "{}", record)?;
                }
            }
            StageFormat::Binary => bincode::serialize_into(&mut writer, records)?,
        }
        writer.flush()?;
    }
    std::fs::rename(&tmp, path)?;
    debug!("Wrote {} records to {}", records.len(), path.display());
    Ok(())
}

pub fn read_records<T, P>(path: P, format: StageFormat) -> Result<Vec<T>>
where
    T: FromStr<Err = Error> + DeserializeOwned,
    P: AsRef<Path>,
{
    let path = path.as_ref();
    if !path.exists() {
        return Err(Error::file_not_found(path));
    }
    let reader = BufReader::new(File::open(path)?);

    match format {
        StageFormat::Text => {
            let mut records = Vec::new();
            for (lineno, line) in reader.lines().enumerate() {
                let line = line?;
                if line.is_empty() {
                    continue;
                }
                let record = line.parse::<T>().map_err(|e| {
                    Error::file_not_valid(path, Some(format!("line {}: {}", lineno + 1, e)))
                })?;
                records.push(record);
            }
            Ok(records)
        }
        StageFormat::Binary => bincode::deserialize_from(reader)
            .map_err(|e| Error::file_not_valid(path, Some(e.to_string()))),
    }
}

///////////////////////////////
/// Stage outputs kept on disk so an interrupted run can pick up where it stopped.
///
/// A stage is loaded instead of recomputed when its file exists, `force` is off and no
/// earlier stage of this run had to be recomputed. Once one stage is recomputed, every
/// later one is too.
pub struct Checkpoints {
    dir: Option<PathBuf>,
    format: StageFormat,
    force: bool,
    recomputed: bool,
}

impl Checkpoints {
    pub fn new<P: Into<PathBuf>>(dir: P, format: StageFormat, force: bool) -> Self {
        Checkpoints {
            dir: Some(dir.into()),
            format,
            force,
            recomputed: false,
        }
    }

    /// Nothing is written or loaded
    pub fn in_memory() -> Self {
        Checkpoints {
            dir: None,
            format: StageFormat::Binary,
            force: true,
            recomputed: true,
        }
    }

    pub fn path(&self, name: &str) -> Option<PathBuf> {
        self.dir
            .as_ref()
            .map(|dir| dir.join(format!("{}.{}", name, self.format.extension())))
    }

    pub fn resume_or<T, F>(&mut self, name: &str, compute: F) -> Result<Vec<T>>
    where
        T: fmt::Display + FromStr<Err = Error> + Serialize + DeserializeOwned,
        F: FnOnce() -> Result<Vec<T>>,
    {
        let Some(path) = self.path(name) else {
            return compute();
        };

        if !self.force && !self.recomputed && path.exists() {
            info!("Stage {}: resuming from {}", name, path.display());
            return read_records(&path, self.format);
        }

        self.recomputed = true;
        let records = compute()?;
        write_records(&path, self.format, &records)?;
        Ok(records)
    }
}
