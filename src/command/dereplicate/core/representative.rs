use std::fmt;

use super::aggregation::Claim;
use crate::batch::Stage;
use crate::record::{ReadRecord, ReadRecordSet, Signature};
use crate::runtime::{Error, Result};

/// Bases that vote, in tie-break order
const VOTING_BASES: [u8; 4] = [b'a', b't', b'g', b'c'];

///////////////////////////////
/// One line pair of the final output
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ClusterOutput {
    pub signature: Signature,
    pub size: usize,
    pub consensus: String,
}

impl ClusterOutput {
    /// FASTA name: the cluster id and its read count
    pub fn name(&self) -> String {
        format!("{} numberOfReads={}", self.signature, self.size)
    }

    pub fn header(&self) -> String {
        format!(">{}", self.name())
    }
}

impl fmt::Display for ClusterOutput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.header())?;
        write!(f, "{}", self.consensus)
    }
}

///////////////////////////////
/// Majority vote per position over a, t, g and c.
///
/// Only members long enough to reach a position vote on it, and n never votes. A tie goes to
/// the earliest of a t g c, so a position without any vote becomes a. A lone member is returned as is.
pub fn consensus(cluster: &ReadRecordSet) -> String {
    let sequences: Vec<String> = cluster.iter().map(|r| r.sequence().decode()).collect();
    if let [single] = sequences.as_slice() {
        return single.clone();
    }

    let longest = sequences.iter().map(String::len).max().unwrap_or(0);
    let mut result = String::with_capacity(longest);
    for pos in 0..longest {
        let mut tally = [0usize; 4];
        for seq in &sequences {
            if let Some(base) = seq.as_bytes().get(pos) {
                if let Some(i) = VOTING_BASES.iter().position(|b| b == base) {
                    tally[i] += 1;
                }
            }
        }

        let mut winner = 0;
        for i in 1..VOTING_BASES.len() {
            if tally[i] > tally[winner] {
                winner = i;
            }
        }
        result.push(char::from(VOTING_BASES[winner]));
    }
    result
}

///////////////////////////////
/// Stage 3: rebuild each cluster from its claims and reduce it to a consensus read
pub struct RepresentativeStage;

impl Stage for RepresentativeStage {
    type Input = Claim;
    type Key = Signature;
    type Value = ReadRecord;
    type Output = ClusterOutput;

    fn name(&self) -> &str {
        "representative"
    }

    fn map(&self, claim: &Claim) -> Result<Vec<(Signature, ReadRecord)>> {
        Ok(vec![(claim.signature, claim.record.clone())])
    }

    fn reduce(&self, claimed: &Signature, records: &[ReadRecord]) -> Result<Vec<ClusterOutput>> {
        let cluster = ReadRecordSet::from_records(records.iter().cloned());
        if cluster.is_empty() {
            return Err(Error::malformed_record(
                "cluster",
                Some(format!("{} has no members", claimed)),
            ));
        }

        Ok(vec![ClusterOutput {
            signature: cluster.signature(),
            size: cluster.len(),
            consensus: consensus(&cluster),
        }])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::batch::LocalSubstrate;

    fn cluster(seqs: &[&str]) -> ReadRecordSet {
        seqs.iter()
            .enumerate()
            .map(|(i, seq)| ReadRecord::new(format!("r{}", i), seq).unwrap())
            .collect()
    }

    #[test]
    fn majority_with_tie_break() {
        assert_eq!(consensus(&cluster(&["cccccc", "cccncc", "aaaaaa"])), "cccacc");
        assert_eq!(consensus(&cluster(&["gt", "tg"])), "tt");
    }

    #[test]
    fn uneven_lengths() {
        assert_eq!(consensus(&cluster(&["aaa", "aaaa", "cccccc"])), "aaaacc");
    }

    #[test]
    fn lone_member_passes_through() {
        assert_eq!(consensus(&cluster(&["nnatn"])), "nnatn");
    }

    #[test]
    fn positions_without_votes_become_a() {
        assert_eq!(consensus(&cluster(&["anc", "anc", "tnc"])), "aac");
        assert_eq!(consensus(&cluster(&["nnnn", "nnnn"])), "aaaa");
    }

    #[test]
    fn clusters_are_rebuilt_from_claims() {
        let substrate = LocalSubstrate::new(2, 1).unwrap();
        let members = cluster(&["acgt", "acga", "acgt"]);
        let claimed = members.signature();
        let mut claims: Vec<Claim> = members
            .iter()
            .map(|record| Claim {
                signature: claimed,
                record: record.clone(),
            })
            .collect();
        let loner = ReadRecord::new("solo", "tttt").unwrap();
        claims.push(Claim {
            signature: Signature::of(["solo", "elsewhere"]),
            record: loner,
        });

        let mut out = substrate.run(&RepresentativeStage, &claims).unwrap();
        out.sort_by_key(|c| c.size);

        assert_eq!(out.len(), 2);
        assert_eq!(out[0].consensus, "tttt");
        assert_eq!(out[0].signature, Signature::of(["solo"]));
        assert_eq!(out[1].size, 3);
        assert_eq!(out[1].signature, claimed);
        assert_eq!(out[1].consensus, "acgt");
        assert_eq!(out[1].header(), format!(">{} numberOfReads=3", claimed));
    }
}
