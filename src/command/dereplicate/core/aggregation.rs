use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::propagation::CollapseStage;
use crate::batch::{LocalSubstrate, Stage};
use crate::record::{ReadRecord, ReadRecordSet, Signature};
use crate::runtime::{Error, Result};

///////////////////////////////
/// A read together with the cluster it was assigned to
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claim {
    pub signature: Signature,
    pub record: ReadRecord,
}

/// <record>\t<signature>
impl fmt::Display for Claim {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}\t{}", self.record, self.signature)
    }
}

impl FromStr for Claim {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let (record, signature) = s
            .split_once('\t')
            .ok_or_else(|| Error::malformed_record("claim", Some(format!("no tab in {:?}", s))))?;
        Ok(Claim {
            signature: signature.parse()?,
            record: record.parse()?,
        })
    }
}

///////////////////////////////
/// Every read picks the largest cluster it appears in. Ties go to the greater signature
pub struct ClaimStage;

impl Stage for ClaimStage {
    type Input = ReadRecordSet;
    type Key = String;
    type Value = (Signature, ReadRecord);
    type Output = Claim;

    fn name(&self) -> &str {
        "claim"
    }

    fn map(&self, set: &ReadRecordSet) -> Result<Vec<(String, (Signature, ReadRecord))>> {
        let signature = set.signature();
        Ok(set
            .iter()
            .map(|record| (record.id().to_string(), (signature, record.clone())))
            .collect())
    }

    fn reduce(&self, id: &String, candidates: &[(Signature, ReadRecord)]) -> Result<Vec<Claim>> {
        let (signature, record) = candidates
            .iter()
            .max_by_key(|(signature, _)| *signature)
            .ok_or_else(|| Error::malformed_record("claim", Some(format!("no cluster for {}", id))))?;
        Ok(vec![Claim {
            signature: *signature,
            record: record.clone(),
        }])
    }
}

///////////////////////////////
/// Stage 2: union the fragments sharing a signature, then give each read exactly one cluster
pub struct AggregationStage;

impl AggregationStage {
    pub fn run(&self, substrate: &LocalSubstrate, fragments: &[ReadRecordSet]) -> Result<Vec<Claim>> {
        let clusters = substrate.run(&CollapseStage, fragments)?;
        substrate.run(&ClaimStage, &clusters)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set(ids: &[&str]) -> ReadRecordSet {
        ids.iter()
            .map(|id| ReadRecord::new(*id, "ttga").unwrap())
            .collect()
    }

    #[test]
    fn each_read_claims_its_largest_cluster() {
        let substrate = LocalSubstrate::new(2, 1).unwrap();
        let big = set(&["a", "b", "c"]);
        let small = set(&["c", "d"]);
        let claims = AggregationStage
            .run(&substrate, &[big.clone(), small.clone(), big.clone()])
            .unwrap();

        assert_eq!(claims.len(), 4);
        for claim in &claims {
            let expected = if claim.record.id() == "d" { small.signature() } else { big.signature() };
            assert_eq!(claim.signature, expected, "read {}", claim.record.id());
        }
    }

    #[test]
    fn ties_are_broken_by_signature() {
        let substrate = LocalSubstrate::new(2, 1).unwrap();
        let left = set(&["a", "b"]);
        let right = set(&["b", "c"]);
        let claims = substrate.run(&ClaimStage, &[left.clone(), right.clone()]).unwrap();

        let b = claims.iter().find(|c| c.record.id() == "b").unwrap();
        assert_eq!(b.signature, left.signature().max(right.signature()));
    }

    #[test]
    fn text_form() {
        let claim = Claim {
            signature: Signature::of(["r1"]),
            record: ReadRecord::new("r1", "acgt").unwrap(),
        };
        let line = claim.to_string();
        assert!(line.starts_with("r1&acgt&acgt\t1."));
        assert_eq!(line.parse::<Claim>().unwrap(), claim);
        assert!("r1&acgt&acgt".parse::<Claim>().is_err());
    }
}
