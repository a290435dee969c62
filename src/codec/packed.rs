/*
  Three bases per byte over the alphabet a t g c n (index 0..5)

  byte 0..=124      full run of 3 bases      25*i0 + 5*i1 + i2
  byte 125..=149    trailing run of 2 bases  125 + 5*i0 + i1
  byte 150..=154    trailing single base     150 + i0
  byte 155..=255    invalid

  Only the last byte of a buffer can be a short run, so n bases take ceil(n/3) bytes
*/

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::runtime::{Error, Result};

const NUCLEOTIDES: [u8; 5] = [b'a', b't', b'g', b'c', b'n'];
const NT_N: u8 = 4;

const PAIR_BASE: u8 = 125;
const SINGLE_BASE: u8 = 150;

///////////////////////////////
/// Lookup table for any byte => index into NUCLEOTIDES. Upper case is folded, anything else becomes n
const NT_INDEX: [u8; 256] = {
    let mut table = [NT_N; 256];
    let mut i = 0;
    while i < NUCLEOTIDES.len() {
        let b = NUCLEOTIDES[i];
        table[b as usize] = i as u8;
        table[b.to_ascii_uppercase() as usize] = i as u8;
        i += 1;
    }
    table
};

///////////////////////////////
/// Lookup table for byte => up to 3 decoded bases
const fn generate_decode_table() -> [[u8; 3]; 256] {
    let mut table = [[0u8; 3]; 256];

    let mut i = 0;
    while i < 125 {
        table[i] = [NUCLEOTIDES[i / 25], NUCLEOTIDES[(i / 5) % 5], NUCLEOTIDES[i % 5]];
        i += 1;
    }

    let mut i = 0;
    while i < 25 {
        table[PAIR_BASE as usize + i] = [NUCLEOTIDES[i / 5], NUCLEOTIDES[i % 5], 0];
        i += 1;
    }

    let mut i = 0;
    while i < 5 {
        table[SINGLE_BASE as usize + i] = [NUCLEOTIDES[i], 0, 0];
        i += 1;
    }
    table
}

///////////////////////////////
/// Lookup table for byte => number of bases it holds. 0 marks a corrupt byte
const fn generate_width_table() -> [u8; 256] {
    let mut table = [0u8; 256];
    let mut i = 0;
    while i < 256 {
        table[i] = if i < PAIR_BASE as usize {
            3
        } else if i < SINGLE_BASE as usize {
            2
        } else if i < SINGLE_BASE as usize + 5 {
            1
        } else {
            0
        };
        i += 1;
    }
    table
}

const DECODE_LOOKUP: [[u8; 3]; 256] = generate_decode_table();
const WIDTH_LOOKUP: [u8; 256] = generate_width_table();

#[inline(always)]
fn char_index(c: char) -> u8 {
    if c.is_ascii() {
        NT_INDEX[c as usize]
    } else {
        NT_N
    }
}

///////////////////////////////
/// Pack a stream of alphabet indices
fn pack<I: Iterator<Item = u8>>(indices: I, len_hint: usize) -> Vec<u8> {
    let mut packed = Vec::with_capacity(len_hint.div_ceil(3));
    let mut run = [0u8; 3];
    let mut filled = 0;

    for idx in indices {
        run[filled] = idx;
        filled += 1;
        if filled == 3 {
            packed.push(run[0] * 25 + run[1] * 5 + run[2]);
            filled = 0;
        }
    }

    match filled {
        1 => packed.push(SINGLE_BASE + run[0]),
        2 => packed.push(PAIR_BASE + run[0] * 5 + run[1]),
        _ => {}
    }
    packed
}

#[cold]
fn corrupt_byte(byte: u8, offset: usize) -> Error {
    Error::malformed_record(
        "packed sequence",
        Some(format!("byte {:#04x} at offset {} is outside the codec ranges", byte, offset)),
    )
}

/// Encode a nucleotide string, ceil(n/3) bytes for n characters
pub fn encode(sequence: &str) -> Vec<u8> {
    pack(sequence.chars().map(char_index), sequence.len())
}

/// Decode a packed buffer. Fails on any byte outside the three lookup ranges
pub fn decode(bytes: &[u8]) -> Result<String> {
    let mut sequence = String::with_capacity(bytes.len() * 3);
    for (offset, &b) in bytes.iter().enumerate() {
        let width = WIDTH_LOOKUP[b as usize] as usize;
        if width == 0 {
            return Err(corrupt_byte(b, offset));
        }
        for &nt in &DECODE_LOOKUP[b as usize][..width] {
            sequence.push(nt as char);
        }
    }
    Ok(sequence)
}

/// Number of encoded bases
pub fn length(bytes: &[u8]) -> Result<usize> {
    bytes.iter().enumerate().try_fold(0usize, |acc, (offset, &b)| {
        match WIDTH_LOOKUP[b as usize] {
            0 => Err(corrupt_byte(b, offset)),
            w => Ok(acc + w as usize),
        }
    })
}

///////////////////////////////
/// Number of bases of a well-formed buffer: valid bytes, and a short run only as the last byte
fn checked_length(bytes: &[u8]) -> Result<usize> {
    let last = bytes.len().saturating_sub(1);
    let mut total = 0;
    for (offset, &b) in bytes.iter().enumerate() {
        let width = WIDTH_LOOKUP[b as usize] as usize;
        if width == 0 {
            return Err(corrupt_byte(b, offset));
        }
        if width < 3 && offset != last {
            return Err(Error::malformed_record(
                "packed sequence",
                Some(format!("short run byte {:#04x} before the end, at offset {}", b, offset)),
            ));
        }
        total += width;
    }
    Ok(total)
}

///////////////////////////////
/// Sub-sequence [start, end) by base offset. Only the covering bytes are decoded
pub fn slice(bytes: &[u8], start: usize, end: usize) -> Result<Vec<u8>> {
    let total = checked_length(bytes)?;
    if start > end || end > total {
        return Err(Error::malformed_record(
            "sequence slice",
            Some(format!("range {}..{} is invalid for {} bases", start, end, total)),
        ));
    }
    if start == end {
        return Ok(Vec::new());
    }

    let first_byte = start / 3;
    let last_byte = end.div_ceil(3);
    let covering = decode(&bytes[first_byte..last_byte])?;

    let offset = first_byte * 3;
    Ok(encode(&covering[(start - offset)..(end - offset)]))
}

///////////////////////////////
/// A validated packed nucleotide string. Carries no identity of its own
#[derive(Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "Vec<u8>", into = "Vec<u8>")]
pub struct PackedSequence {
    bytes: Box<[u8]>,
}

impl PackedSequence {
    pub fn encode(sequence: &str) -> Self {
        PackedSequence {
            bytes: encode(sequence).into_boxed_slice(),
        }
    }

    pub fn encode_bytes(sequence: &[u8]) -> Self {
        let indices = sequence.iter().map(|&b| NT_INDEX[b as usize]);
        PackedSequence {
            bytes: pack(indices, sequence.len()).into_boxed_slice(),
        }
    }

    /// Validate raw bytes; short runs are only allowed in the last byte
    pub fn from_bytes(bytes: Vec<u8>) -> Result<Self> {
        checked_length(&bytes)?;
        Ok(PackedSequence {
            bytes: bytes.into_boxed_slice(),
        })
    }

    pub fn decode(&self) -> String {
        let mut sequence = String::with_capacity(self.bytes.len() * 3);
        for &b in self.bytes.iter() {
            let width = WIDTH_LOOKUP[b as usize] as usize;
            for &nt in &DECODE_LOOKUP[b as usize][..width] {
                sequence.push(nt as char);
            }
        }
        sequence
    }

    /// Number of bases
    #[inline]
    pub fn len(&self) -> usize {
        match self.bytes.last() {
            Some(&b) => (self.bytes.len() - 1) * 3 + WIDTH_LOOKUP[b as usize] as usize,
            None => 0,
        }
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    pub fn slice(&self, start: usize, end: usize) -> Result<Self> {
        let bytes = slice(&self.bytes, start, end)?;
        Ok(PackedSequence {
            bytes: bytes.into_boxed_slice(),
        })
    }
}

impl TryFrom<Vec<u8>> for PackedSequence {
    type Error = Error;

    fn try_from(bytes: Vec<u8>) -> Result<Self> {
        PackedSequence::from_bytes(bytes)
    }
}

impl From<PackedSequence> for Vec<u8> {
    fn from(packed: PackedSequence) -> Self {
        packed.bytes.into_vec()
    }
}

impl fmt::Display for PackedSequence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.decode())
    }
}

impl fmt::Debug for PackedSequence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PackedSequence({})", self.decode())
    }
}
