use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use super::{ReadRecord, Signature, RECORD_SEPARATOR};
use crate::codec::PackedSequence;
use crate::runtime::{Error, Result};

const LENGTH_PREFIX: &str = "length=";

///////////////////////////////
/// A cluster of reads, unique by id and kept sorted by id.
///
/// Sets are never mutated once shared; merging always builds a new set.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct ReadRecordSet {
    members: BTreeSet<ReadRecord>,
    size: usize,
}

impl ReadRecordSet {
    /// Later records with an id already present are dropped
    pub fn from_records<I>(records: I) -> Self
    where
        I: IntoIterator<Item = ReadRecord>,
    {
        let members: BTreeSet<ReadRecord> = records.into_iter().collect();
        let size = members.len();
        ReadRecordSet { members, size }
    }

    pub fn singleton(record: ReadRecord) -> Self {
        Self::from_records([record])
    }

    pub fn union(&self, other: &ReadRecordSet) -> Self {
        Self::union_all([self, other])
    }

    pub fn union_all<'a, I>(sets: I) -> Self
    where
        I: IntoIterator<Item = &'a ReadRecordSet>,
    {
        let mut members = BTreeSet::new();
        for set in sets {
            for record in &set.members {
                if !members.contains(record) {
                    members.insert(record.clone());
                }
            }
        }
        let size = members.len();
        ReadRecordSet { members, size }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.size
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.size == 0
    }

    pub fn iter(&self) -> impl Iterator<Item = &ReadRecord> {
        self.members.iter()
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.members.iter().map(|r| r.id())
    }

    pub fn contains_id(&self, id: &str) -> bool {
        self.members.contains(id)
    }

    /// True if some member has exactly this matching key
    pub fn contains_key(&self, key: &PackedSequence) -> bool {
        self.members.iter().any(|r| r.key() == key)
    }

    pub fn signature(&self) -> Signature {
        Signature::of(self.ids())
    }
}

impl FromIterator<ReadRecord> for ReadRecordSet {
    fn from_iter<T: IntoIterator<Item = ReadRecord>>(iter: T) -> Self {
        Self::from_records(iter)
    }
}

impl IntoIterator for ReadRecordSet {
    type Item = ReadRecord;
    type IntoIter = std::collections::btree_set::IntoIter<ReadRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.members.into_iter()
    }
}

///////////////////////////////
/// Binary form: member count, then the members
impl Serialize for ReadRecordSet {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_seq(&self.members)
    }
}

impl<'de> Deserialize<'de> for ReadRecordSet {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let records = Vec::<ReadRecord>::deserialize(deserializer)?;
        Ok(ReadRecordSet::from_records(records))
    }
}

///////////////////////////////
/// Text form: length=<n>,<rec1>,<rec2>,...
impl fmt::Display for ReadRecordSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", LENGTH_PREFIX, self.size)?;
        for record in &self.members {
            write!(f, "{}{}", RECORD_SEPARATOR, record)?;
        }
        Ok(())
    }
}

impl fmt::Debug for ReadRecordSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ReadRecordSet({})", self)
    }
}

impl FromStr for ReadRecordSet {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let mut fields = s.split(RECORD_SEPARATOR);
        let declared = fields
            .next()
            .and_then(|head| head.strip_prefix(LENGTH_PREFIX))
            .and_then(|n| n.parse::<usize>().ok())
            .ok_or_else(|| {
                Error::malformed_record("read record set", Some(format!("missing length in '{}'", s)))
            })?;

        let records = fields
            .map(|field| field.parse::<ReadRecord>())
            .collect::<Result<Vec<_>>>()?;
        if records.len() != declared {
            return Err(Error::malformed_record(
                "read record set",
                Some(format!("declared {} records, found {}", declared, records.len())),
            ));
        }
        Ok(ReadRecordSet::from_records(records))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rec(id: &str, seq: &str) -> ReadRecord {
        ReadRecord::new(id, seq).unwrap()
    }

    #[test]
    fn duplicates_are_dropped() {
        let set = ReadRecordSet::from_records([rec("b", "aaa"), rec("a", "ccc"), rec("b", "ggg")]);
        assert_eq!(set.len(), 2);
        assert_eq!(set.ids().collect::<Vec<_>>(), vec!["a", "b"]);
        // first occurrence wins
        let b = set.iter().find(|r| r.id() == "b").unwrap();
        assert_eq!(b.sequence().decode(), "aaa");
    }

    #[test]
    fn union_builds_a_new_set() {
        let left = ReadRecordSet::from_records([rec("a", "aaa"), rec("b", "aat")]);
        let right = ReadRecordSet::from_records([rec("b", "aat"), rec("c", "att")]);
        let merged = left.union(&right);

        assert_eq!(merged.len(), 3);
        assert_eq!(left.len(), 2);
        assert_eq!(right.len(), 2);
        assert!(merged.contains_id("c"));
    }

    #[test]
    fn signature_ignores_merge_order() {
        let parts = [
            ReadRecordSet::from_records([rec("a", "aaa"), rec("b", "aat")]),
            ReadRecordSet::from_records([rec("c", "att")]),
            ReadRecordSet::from_records([rec("b", "aat"), rec("d", "ttt")]),
        ];
        let one = parts[0].union(&parts[1]).union(&parts[2]);
        let two = parts[2].union(&parts[0]).union(&parts[1]);
        let three = ReadRecordSet::union_all(parts.iter().rev());

        assert_eq!(one.signature(), two.signature());
        assert_eq!(two.signature(), three.signature());
        assert_eq!(one.signature().size(), 4);
    }

    #[test]
    fn contains_key_checks_matching_keys() {
        let set = ReadRecordSet::from_records([rec("a", "acgt")]);
        assert!(set.contains_key(&PackedSequence::encode("acgt")));
        assert!(!set.contains_key(&PackedSequence::encode("acgg")));
    }

    #[test]
    fn text_form() {
        let set = ReadRecordSet::from_records([rec("r2", "ttt"), rec("r1", "acg")]);
        let text = set.to_string();
        assert_eq!(text, "length=2,r1&acg&acg,r2&ttt&ttt");

        let back: ReadRecordSet = text.parse().unwrap();
        assert_eq!(back, set);
        assert_eq!(back.signature(), set.signature());

        assert_eq!("length=0".parse::<ReadRecordSet>().unwrap().len(), 0);
        assert!("length=3,r1&acg&acg".parse::<ReadRecordSet>().is_err());
        assert!("r1&acg&acg".parse::<ReadRecordSet>().is_err());
    }

    #[test]
    fn binary_form_is_count_then_records() {
        let set = ReadRecordSet::from_records([rec("r1", "acg"), rec("r2", "ttt")]);
        let bytes = bincode::serialize(&set).unwrap();
        assert_eq!(&bytes[..8], &2u64.to_le_bytes());

        let back: ReadRecordSet = bincode::deserialize(&bytes).unwrap();
        assert_eq!(back, set);
    }
}
