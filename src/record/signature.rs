use std::fmt;
use std::hash::Hasher;
use std::str::FromStr;

use rustc_hash::FxHasher;
use serde::{Deserialize, Serialize};

use crate::runtime::{Error, Result};

///////////////////////////////
/// Stable hash of a read id. FxHasher is unseeded, so every task computes the same value
#[inline]
pub fn hash_id(id: &str) -> u64 {
    let mut hasher = FxHasher::default();
    hasher.write(id.as_bytes());
    hasher.finish()
}

///////////////////////////////
/// Cluster identity: member count plus the wrapping sum of member id hashes.
///
/// The sum commutes, so two partial views of one cluster built on different
/// tasks, in any order, agree on the signature without talking to each other.
/// Ordering is by size first, which is what "largest cluster" means downstream.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Signature {
    size: u64,
    hash_sum: u64,
}

impl Signature {
    pub fn of<'a, I>(ids: I) -> Self
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut size = 0u64;
        let mut hash_sum = 0u64;
        for id in ids {
            size += 1;
            hash_sum = hash_sum.wrapping_add(hash_id(id));
        }
        Signature { size, hash_sum }
    }

    pub fn size(&self) -> u64 {
        self.size
    }
}

/// Textual cluster id: <size>.<hash sum in hex>
impl fmt::Display for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{:016x}", self.size, self.hash_sum)
    }
}

impl FromStr for Signature {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let malformed = || Error::malformed_record("cluster signature", Some(format!("'{}'", s)));

        let (size, hash_sum) = s.split_once('.').ok_or_else(malformed)?;
        let size = size.parse::<u64>().map_err(|_| malformed())?;
        let hash_sum = u64::from_str_radix(hash_sum, 16).map_err(|_| malformed())?;
        Ok(Signature { size, hash_sum })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn order_independent() {
        let a = Signature::of(["r1", "r2", "r3"]);
        let b = Signature::of(["r3", "r1", "r2"]);
        assert_eq!(a, b);
        assert_eq!(a.size(), 3);
        assert_ne!(a, Signature::of(["r1", "r2"]));
    }

    #[test]
    fn larger_clusters_sort_last() {
        let small = Signature::of(["zzz"]);
        let large = Signature::of(["a", "b"]);
        assert!(small < large);
    }

    #[test]
    fn text_round_trip() {
        let sig = Signature::of(["r1", "r2"]);
        let text = sig.to_string();
        assert!(text.starts_with("2."));
        assert_eq!(text.parse::<Signature>().unwrap(), sig);

        assert!("2".parse::<Signature>().is_err());
        assert!("x.00".parse::<Signature>().is_err());
        assert!("2.zz".parse::<Signature>().is_err());
    }
}
