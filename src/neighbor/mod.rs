//! Substitution neighborhoods, used to turn "approximately equal" into "share a key".
//!
//! The expansion is a breadth-first walk over the Hamming graph on the
//! alphabet `a t g c n`. A global visited set keeps each variant in exactly
//! one layer: the layer at depth `d` holds the strings at exactly `d`
//! substitutions from the seed.

use rustc_hash::FxHashSet;

use crate::codec::PackedSequence;

pub const ALPHABET: [u8; 5] = [b'a', b't', b'g', b'c', b'n'];

/// Largest radius the pipeline accepts for its pairing keys
pub const MAX_LINK_RADIUS: usize = 4;

///////////////////////////////
/// Lower-case, anything outside the alphabet becomes n
fn normalize(sequence: &str) -> Vec<u8> {
    sequence
        .chars()
        .map(|c| {
            let c = c.to_ascii_lowercase();
            if c.is_ascii() && ALPHABET.contains(&(c as u8)) {
                c as u8
            } else {
                b'n'
            }
        })
        .collect()
}

fn to_string(bytes: &[u8]) -> String {
    bytes.iter().map(|&b| char::from(b)).collect()
}

///////////////////////////////
/// Walk the layers 1..=radius around the seed. The callback sees each variant once, with its depth
fn expand<F>(seed: &[u8], radius: usize, mut visit: F)
where
    F: FnMut(usize, &[u8]),
{
    let mut visited: FxHashSet<Vec<u8>> = FxHashSet::default();
    visited.insert(seed.to_vec());

    let mut frontier = vec![seed.to_vec()];
    for depth in 1..=radius {
        let mut next = Vec::new();
        for current in &frontier {
            for pos in 0..current.len() {
                for &nt in &ALPHABET {
                    if current[pos] == nt {
                        continue;
                    }
                    let mut candidate = current.clone();
                    candidate[pos] = nt;
                    if !visited.contains(&candidate) {
                        visited.insert(candidate.clone());
                        visit(depth, &candidate);
                        next.push(candidate);
                    }
                }
            }
        }
        if next.is_empty() {
            break;
        }
        frontier = next;
    }
}

///////////////////////////////
/// The direct-match key plus the single layer of strings at exactly `radius` substitutions.
///
/// Closer layers are left out; [`variants`] is the full neighborhood, every string within
/// 1..=radius substitutions without the seed, and is what pairing keys are built from.
/// For radius 0 this is the singleton seed. An empty sequence has no neighbors at any radius.
pub fn neighbors(sequence: &str, radius: usize) -> FxHashSet<String> {
    let mut result = FxHashSet::default();
    if sequence.is_empty() {
        return result;
    }

    let seed = normalize(sequence);
    expand(&seed, radius, |depth, variant| {
        if depth == radius {
            result.insert(to_string(variant));
        }
    });
    result.insert(to_string(&seed));
    result
}

///////////////////////////////
/// The substitution neighborhood: every string within 1..=radius substitutions, accumulated
/// over all layers. The seed itself is excluded
pub fn variants(sequence: &str, radius: usize) -> FxHashSet<String> {
    let mut result = FxHashSet::default();
    if sequence.is_empty() {
        return result;
    }

    let seed = normalize(sequence);
    expand(&seed, radius, |_, variant| {
        result.insert(to_string(variant));
    });
    result
}

///////////////////////////////
/// Packed pairing keys of a matching key: the key itself first, then all its variants within radius
pub fn neighbor_keys(key: &PackedSequence, radius: usize) -> Vec<PackedSequence> {
    let mut keys = vec![key.clone()];
    if key.is_empty() {
        return keys;
    }

    let seed = key.decode().into_bytes();
    expand(&seed, radius, |_, variant| {
        keys.push(PackedSequence::encode_bytes(variant));
    });
    keys
}

///////////////////////////////
/// Matching key of a read: the whole sequence, or the first `window` bases followed by the
/// last `window` bases read backwards. Reads shorter than the window keep their whole sequence
pub fn match_key(sequence: &str, window: Option<usize>) -> String {
    match window {
        Some(w) if w > 0 && sequence.len() >= w && sequence.is_ascii() => {
            let mut key = String::with_capacity(2 * w);
            key.push_str(&sequence[..w]);
            key.extend(sequence[sequence.len() - w..].chars().rev());
            key
        }
        _ => sequence.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn radius_zero_is_the_seed() {
        let n = neighbors("acgtn", 0);
        assert_eq!(n.len(), 1);
        assert!(n.contains("acgtn"));

        assert!(variants("acgtn", 0).is_empty());
    }

    #[test]
    fn empty_sequence_has_no_neighbors() {
        assert!(neighbors("", 0).is_empty());
        assert!(neighbors("", 3).is_empty());
        assert!(variants("", 2).is_empty());
        assert_eq!(neighbor_keys(&PackedSequence::encode(""), 1).len(), 1);
    }

    #[test]
    fn variants_within_one_substitution() {
        let v = variants("aaa", 1);
        assert_eq!(v.len(), 12);
        assert!(!v.contains("aaa"));
        assert!(v.contains("aat"));
        assert!(v.contains("naa"));
    }

    #[test]
    fn neighbor_cardinality_regression() {
        assert_eq!(neighbors("aaaacagtct", 1).len(), 41);
        assert_eq!(neighbors("aaaacagtct", 2).len(), 721);
        assert_eq!(neighbors("aaaacagtct", 3).len(), 7681);
        assert_eq!(neighbors("aaaacagtct", 4).len(), 53761);
    }

    #[test]
    fn variants_accumulate_every_layer() {
        // 40 at one substitution, 45 * 16 at two
        assert_eq!(variants("aaaacagtct", 2).len(), 40 + 720);
    }

    #[test]
    fn variants_are_every_layer_of_neighbors() {
        let seed = "acgtn";
        let mut layers: FxHashSet<String> = FxHashSet::default();
        for r in 1..=3 {
            layers.extend(neighbors(seed, r));
        }
        layers.remove(seed);
        assert_eq!(variants(seed, 3), layers);
        assert!(!neighbors(seed, 2).iter().any(|s| variants(seed, 1).contains(s)));
    }

    #[test]
    fn input_is_normalized() {
        let n = neighbors("AcX", 0);
        assert!(n.contains("acn"));
    }

    #[test]
    fn neighbor_keys_start_with_the_key() {
        let key = PackedSequence::encode("acg");
        let keys = neighbor_keys(&key, 1);
        assert_eq!(keys[0], key);
        assert_eq!(keys.len(), 13);
        assert!(keys.contains(&PackedSequence::encode("ncg")));
    }

    #[test]
    fn window_key_reads_both_ends() {
        assert_eq!(match_key("aaccggtt", Some(2)), "aatt");
        assert_eq!(match_key("acgtac", Some(3)), "acgcat");
        assert_eq!(match_key("ac", Some(3)), "ac");
        assert_eq!(match_key("acgt", None), "acgt");
    }
}
