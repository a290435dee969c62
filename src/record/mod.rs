mod read_record;
mod record_set;
mod signature;

pub use read_record::ReadRecord;
pub use record_set::ReadRecordSet;
pub use signature::{hash_id, Signature};

/// Separates the fields of one record on the wire
pub const FIELD_SEPARATOR: char = '&';
/// Separates the records of one record set on the wire
pub const RECORD_SEPARATOR: char = ',';
