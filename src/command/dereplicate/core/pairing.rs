use crate::batch::Stage;
use crate::codec::PackedSequence;
use crate::neighbor;
use crate::record::{ReadRecord, ReadRecordSet};
use crate::runtime::Result;

///////////////////////////////
/// Stage 0: every read is sent to its own matching key and to every key within the link radius.
///
/// A key group is kept only when the key is the matching key of one of its members, so a
/// group is one read plus everything within link radius of it. Each kept group is the
/// clique of candidate edges between its members; a read with no neighbors comes out as
/// its own singleton group.
pub struct PairingStage {
    pub link_radius: usize,
}

impl Stage for PairingStage {
    type Input = ReadRecord;
    type Key = PackedSequence;
    type Value = ReadRecord;
    type Output = ReadRecordSet;

    fn name(&self) -> &str {
        "pairing"
    }

    fn map(&self, read: &ReadRecord) -> Result<Vec<(PackedSequence, ReadRecord)>> {
        Ok(neighbor::neighbor_keys(read.key(), self.link_radius)
            .into_iter()
            .map(|key| (key, read.clone()))
            .collect())
    }

    fn reduce(&self, key: &PackedSequence, reads: &[ReadRecord]) -> Result<Vec<ReadRecordSet>> {
        let group = ReadRecordSet::from_records(reads.iter().cloned());
        if group.contains_key(key) {
            Ok(vec![group])
        } else {
            Ok(Vec::new())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::batch::LocalSubstrate;

    fn rec(id: &str, seq: &str) -> ReadRecord {
        ReadRecord::new(id, seq).unwrap()
    }

    fn ids(set: &ReadRecordSet) -> Vec<&str> {
        set.ids().collect()
    }

    #[test]
    fn identical_reads_share_a_group() {
        let substrate = LocalSubstrate::new(2, 1).unwrap();
        let reads = vec![rec("r1", "acgtac"), rec("r2", "acgtac"), rec("r3", "acgtac")];
        let groups = substrate.run(&PairingStage { link_radius: 0 }, &reads).unwrap();
        assert_eq!(groups.len(), 1);
        assert_eq!(ids(&groups[0]), vec!["r1", "r2", "r3"]);
    }

    #[test]
    fn one_substitution_links_reads() {
        let substrate = LocalSubstrate::new(2, 1).unwrap();
        let reads = vec![rec("a", "aaaaaa"), rec("b", "aaacaa"), rec("far", "gggggg")];
        let groups = substrate.run(&PairingStage { link_radius: 1 }, &reads).unwrap();

        // centered on a, centered on b, and the lone far read
        assert_eq!(groups.len(), 3);
        let linked: Vec<_> = groups.iter().filter(|g| g.len() == 2).collect();
        assert_eq!(linked.len(), 2);
        assert!(groups.iter().any(|g| ids(g) == vec!["far"]));
    }

    #[test]
    fn two_substitutions_do_not_link_at_radius_one() {
        let substrate = LocalSubstrate::new(2, 1).unwrap();
        // they share neighbor keys such as "aacaaa", but nobody owns those keys
        let reads = vec![rec("a", "aaaaaa"), rec("b", "aacaca")];
        let groups = substrate.run(&PairingStage { link_radius: 1 }, &reads).unwrap();
        assert_eq!(groups.len(), 2);
        assert!(groups.iter().all(|g| g.len() == 1));
    }
}
