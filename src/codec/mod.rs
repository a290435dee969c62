mod packed;

pub use packed::{decode, encode, length, slice, PackedSequence};
