use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;

use log::{debug, warn};
use seq_io::fasta::Reader as FastaReader;
use seq_io::fasta::Record as FastaRecord;
use seq_io::fastq::Reader as FastqReader;
use seq_io::fastq::Record as FastqRecord;

use crate::record::ReadRecord;
use crate::runtime::{Error, Result};

///////////////////////////////
/// Open a possibly compressed sequence file
fn open_sequence_file(path: &Path) -> Result<BufReader<Box<dyn std::io::Read>>> {
    if !path.exists() {
        return Err(Error::file_not_found(path));
    }
    let opened_handle = File::open(path)?;
    let (reader, compression) = niffler::get_reader(Box::new(opened_handle))
        .map_err(|e| Error::file_not_valid(path, Some(e.to_string())))?;

    debug!(
        "Opened file {} with compression {:?}",
        path.display(),
        compression
    );
    Ok(BufReader::new(reader))
}

fn to_record(
    path: &Path,
    id: std::result::Result<&str, std::str::Utf8Error>,
    seq: &[u8],
    window: Option<usize>,
) -> Result<Option<ReadRecord>> {
    let id = id.map_err(|e| Error::file_not_valid(path, Some(format!("read name is not UTF-8: {}", e))))?;
    if seq.is_empty() {
        warn!("Skipping read {} in {}: empty sequence", id, path.display());
        return Ok(None);
    }
    let seq = String::from_utf8_lossy(seq);
    ReadRecord::with_window(id, &seq, window).map(Some)
}

///////////////////////////////
/// Read every record of a FASTA or FASTQ file, gzip and friends included.
/// The read id is the header up to the first whitespace
pub fn read_fasta<P: AsRef<Path>>(path: P, window: Option<usize>) -> Result<Vec<ReadRecord>> {
    let path = path.as_ref();
    let mut reader = open_sequence_file(path)?;
    let first = reader.fill_buf()?.first().copied();

    let mut records = Vec::new();
    match first {
        None => {}
        Some(b'>') => {
            let mut fasta = FastaReader::new(reader);
            while let Some(record) = fasta.next() {
                let record = record.map_err(|e| Error::file_not_valid(path, Some(e.to_string())))?;
                let seq = record.full_seq();
                if let Some(read) = to_record(path, record.id(), &seq, window)? {
                    records.push(read);
                }
            }
        }
        Some(b'@') => {
            let mut fastq = FastqReader::new(reader);
            while let Some(record) = fastq.next() {
                let record = record.map_err(|e| Error::file_not_valid(path, Some(e.to_string())))?;
                if let Some(read) = to_record(path, record.id(), record.seq(), window)? {
                    records.push(read);
                }
            }
        }
        Some(c) => {
            return Err(Error::file_not_valid(
                path,
                Some(format!("expected FASTA or FASTQ, found {:?} at the start", char::from(c))),
            ))
        }
    }
    debug!("Read {} records from {}", records.len(), path.display());
    Ok(records)
}

///////////////////////////////
/// Write (name, sequence) pairs as FASTA. The file appears only once complete
pub fn write_fasta<'a, P, I>(path: P, records: I) -> Result<()>
where
    P: AsRef<Path>,
    I: IntoIterator<Item = (String, &'a str)>,
{
    let path = path.as_ref();
    let tmp = super::checkpoint::partial_path(path);
    {
        let mut writer = BufWriter::new(File::create(&tmp)?);
        for (name, seq) in records {
            writeln!(writer, ">{}", name)?;
            writeln!(writer, "{}", seq)?;
        }
        writer.flush()?;
    }
    std::fs::rename(&tmp, path)?;
    Ok(())
}
