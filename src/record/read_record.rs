use std::borrow::Borrow;
use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::{FIELD_SEPARATOR, RECORD_SEPARATOR};
use crate::codec::PackedSequence;
use crate::neighbor;
use crate::runtime::{Error, Result};

///////////////////////////////
/// A single read. Identity, equality and ordering are the id alone
#[derive(Clone, Serialize, Deserialize)]
#[serde(try_from = "RecordFields")]
pub struct ReadRecord {
    id: String,
    key: PackedSequence,
    sequence: PackedSequence,
}

#[derive(Deserialize)]
struct RecordFields {
    id: String,
    key: PackedSequence,
    sequence: PackedSequence,
}

impl TryFrom<RecordFields> for ReadRecord {
    type Error = Error;

    fn try_from(fields: RecordFields) -> Result<Self> {
        ReadRecord::from_parts(fields.id, fields.key, fields.sequence)
    }
}

fn check_id(id: &str) -> Result<()> {
    if id.is_empty() {
        return Err(Error::malformed_record("read record", Some("empty id")));
    }
    if let Some(c) = id
        .chars()
        .find(|&c| c == FIELD_SEPARATOR || c == RECORD_SEPARATOR || c.is_whitespace())
    {
        return Err(Error::malformed_record(
            "read record",
            Some(format!("id '{}' contains reserved character {:?}", id, c)),
        ));
    }
    Ok(())
}

/// Wire sequences must already be normalized
fn check_wire_sequence(field: &str, value: &str) -> Result<PackedSequence> {
    if let Some(c) = value.chars().find(|c| !neighbor::ALPHABET.contains(&(*c as u8)) || !c.is_ascii()) {
        return Err(Error::malformed_record(
            "read record",
            Some(format!("{} contains {:?}, outside the alphabet", field, c)),
        ));
    }
    Ok(PackedSequence::encode(value))
}

impl ReadRecord {
    /// Read with the whole sequence as matching key
    pub fn new<I: Into<String>>(id: I, sequence: &str) -> Result<Self> {
        Self::with_window(id, sequence, None)
    }

    /// Read keyed on the two ends of its sequence, see [`neighbor::match_key`]
    pub fn with_window<I: Into<String>>(id: I, sequence: &str, window: Option<usize>) -> Result<Self> {
        let sequence = PackedSequence::encode(sequence);
        let key = match window {
            None => sequence.clone(),
            Some(_) => PackedSequence::encode(&neighbor::match_key(&sequence.decode(), window)),
        };
        Self::from_parts(id.into(), key, sequence)
    }

    pub fn from_parts(id: String, key: PackedSequence, sequence: PackedSequence) -> Result<Self> {
        check_id(&id)?;
        if sequence.is_empty() {
            return Err(Error::malformed_record(
                "read record",
                Some(format!("read '{}' has an empty sequence", id)),
            ));
        }
        if key.is_empty() {
            return Err(Error::malformed_record(
                "read record",
                Some(format!("read '{}' has an empty matching key", id)),
            ));
        }
        Ok(ReadRecord { id, key, sequence })
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn key(&self) -> &PackedSequence {
        &self.key
    }

    pub fn sequence(&self) -> &PackedSequence {
        &self.sequence
    }
}

impl PartialEq for ReadRecord {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}
impl Eq for ReadRecord {}

impl PartialOrd for ReadRecord {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}
impl Ord for ReadRecord {
    fn cmp(&self, other: &Self) -> Ordering {
        self.id.cmp(&other.id)
    }
}

impl Hash for ReadRecord {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

// Consistent with Eq/Ord/Hash above, so sets can be probed by id
impl Borrow<str> for ReadRecord {
    fn borrow(&self) -> &str {
        &self.id
    }
}

///////////////////////////////
/// Wire format: id&hash&sequence
impl fmt::Display for ReadRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}{}{}{}{}",
            self.id, FIELD_SEPARATOR, self.key, FIELD_SEPARATOR, self.sequence
        )
    }
}

impl fmt::Debug for ReadRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ReadRecord({})", self)
    }
}

impl FromStr for ReadRecord {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let fields: Vec<&str> = s.split(FIELD_SEPARATOR).collect();
        let [id, key, sequence] = fields[..] else {
            return Err(Error::malformed_record(
                "read record",
                Some(format!("expected 3 fields in '{}', got {}", s, fields.len())),
            ));
        };

        let key = check_wire_sequence("hash", key)?;
        let sequence = check_wire_sequence("sequence", sequence)?;
        ReadRecord::from_parts(id.to_string(), key, sequence)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identity_is_the_id() {
        let a = ReadRecord::new("r1", "acgt").unwrap();
        let b = ReadRecord::new("r1", "tttt").unwrap();
        let c = ReadRecord::new("r2", "acgt").unwrap();
        assert_eq!(a, b);
        assert_ne!(a, c);
        assert!(a < c);
    }

    #[test]
    fn sequence_is_normalized() {
        let r = ReadRecord::new("r1", "ACGTRY").unwrap();
        assert_eq!(r.sequence().decode(), "acgtnn");
        assert_eq!(r.key(), r.sequence());
    }

    #[test]
    fn window_key() {
        let r = ReadRecord::with_window("r1", "AACCGGTT", Some(2)).unwrap();
        assert_eq!(r.key().decode(), "aatt");
        assert_eq!(r.sequence().decode(), "aaccggtt");
    }

    #[test]
    fn rejects_bad_records() {
        assert!(ReadRecord::new("", "acgt").is_err());
        assert!(ReadRecord::new("a&b", "acgt").is_err());
        assert!(ReadRecord::new("a,b", "acgt").is_err());
        assert!(ReadRecord::new("r1", "").is_err());
    }

    #[test]
    fn text_wire_format() {
        let r = ReadRecord::with_window("read_7", "acgtac", Some(2)).unwrap();
        let text = r.to_string();
        assert_eq!(text, "read_7&acca&acgtac");

        let back: ReadRecord = text.parse().unwrap();
        assert_eq!(back.id(), "read_7");
        assert_eq!(back.key().decode(), "acca");
        assert_eq!(back.sequence().decode(), "acgtac");
    }

    #[test]
    fn malformed_text_is_an_error() {
        assert!("r1&acgt".parse::<ReadRecord>().is_err());
        assert!("r1&acgt&acgt&x".parse::<ReadRecord>().is_err());
        assert!("r1&acgt&ACGT".parse::<ReadRecord>().is_err());
        assert!("r1&acgt&".parse::<ReadRecord>().is_err());
        assert!(matches!(
            "&acgt&acgt".parse::<ReadRecord>(),
            Err(Error::MalformedRecord { .. })
        ));
    }

    #[test]
    fn binary_wire_format() {
        let r = ReadRecord::new("r9", "gattaca").unwrap();
        let bytes = bincode::serialize(&r).unwrap();
        let back: ReadRecord = bincode::deserialize(&bytes).unwrap();
        assert_eq!(back.id(), "r9");
        assert_eq!(back.sequence().decode(), "gattaca");
    }
}
