//! On-disk record framing
//!
//! Record files are sequences of framed records:
//!
//! ```text
//! +------------------+
//! | Record Length    | (u32 LE, total including this field and checksum)
//! +------------------+
//! | Body             | (per kind, see below)
//! +------------------+
//! | Checksum         | (u32 LE, CRC32 over length + body)
//! +------------------+
//! ```
//!
//! Bodies use length-prefixed UTF-8 strings (u32 LE prefix) and fixed-width
//! little-endian integers:
//!
//! - entity column: label, descriptor, description
//! - history item: timestamp (i64), year (i32), day (i32), content, properties
//! - relationship: parent, child, role

use std::io::{self, Cursor, Read};

use super::checksum::{compute_checksum, verify_checksum};
use crate::errors::{LoreError, LoreResult};
use crate::model::{EntityColumn, EntityRelationship, HistoryItem, RecordKind};

/// Frame overhead: length prefix plus trailing checksum.
const FRAME_BYTES: usize = 4 + 4;

/// Upper bound on a single framed record. A length prefix beyond this is
/// treated as corruption rather than an allocation request.
const MAX_RECORD_BYTES: usize = 64 * 1024 * 1024;

/// Encoding of one record kind into a record-file body.
pub(crate) trait RecordEncoding: Sized {
    /// The kind this encoding belongs to.
    fn kind() -> RecordKind;

    /// Checks that the record can cross the boundary and be stored.
    fn validate(&self) -> LoreResult<()>;

    /// Appends the body bytes to `buf`.
    fn encode_body(&self, buf: &mut Vec<u8>);

    /// Reads the body bytes back.
    fn decode_body(cursor: &mut Cursor<&[u8]>) -> io::Result<Self>;
}

impl RecordEncoding for EntityColumn {
    fn kind() -> RecordKind {
        RecordKind::EntityColumn
    }

    fn validate(&self) -> LoreResult<()> {
        EntityColumn::validate(self)
    }

    fn encode_body(&self, buf: &mut Vec<u8>) {
        put_string(buf, &self.label);
        put_string(buf, &self.descriptor);
        put_string(buf, &self.description);
    }

    fn decode_body(cursor: &mut Cursor<&[u8]>) -> io::Result<Self> {
        Ok(Self {
            label: read_string(cursor)?,
            descriptor: read_string(cursor)?,
            description: read_string(cursor)?,
        })
    }
}

impl RecordEncoding for HistoryItem {
    fn kind() -> RecordKind {
        RecordKind::HistoryItem
    }

    fn validate(&self) -> LoreResult<()> {
        HistoryItem::validate(self)
    }

    fn encode_body(&self, buf: &mut Vec<u8>) {
        buf.extend_from_slice(&self.timestamp.to_le_bytes());
        buf.extend_from_slice(&self.year.to_le_bytes());
        buf.extend_from_slice(&self.day.to_le_bytes());
        put_string(buf, &self.content);
        put_string(buf, &self.properties);
    }

    fn decode_body(cursor: &mut Cursor<&[u8]>) -> io::Result<Self> {
        let mut timestamp = [0u8; 8];
        cursor.read_exact(&mut timestamp)?;
        let mut year = [0u8; 4];
        cursor.read_exact(&mut year)?;
        let mut day = [0u8; 4];
        cursor.read_exact(&mut day)?;
        Ok(Self {
            timestamp: i64::from_le_bytes(timestamp),
            year: i32::from_le_bytes(year),
            day: i32::from_le_bytes(day),
            content: read_string(cursor)?,
            properties: read_string(cursor)?,
        })
    }
}

impl RecordEncoding for EntityRelationship {
    fn kind() -> RecordKind {
        RecordKind::Relationship
    }

    fn validate(&self) -> LoreResult<()> {
        EntityRelationship::validate(self)
    }

    fn encode_body(&self, buf: &mut Vec<u8>) {
        put_string(buf, &self.parent);
        put_string(buf, &self.child);
        put_string(buf, &self.role);
    }

    fn decode_body(cursor: &mut Cursor<&[u8]>) -> io::Result<Self> {
        Ok(Self {
            parent: read_string(cursor)?,
            child: read_string(cursor)?,
            role: read_string(cursor)?,
        })
    }
}

/// Serializes one record into its complete frame.
pub(crate) fn encode_record<T: RecordEncoding>(record: &T) -> Vec<u8> {
    let mut body = Vec::new();
    record.encode_body(&mut body);

    let record_length = (FRAME_BYTES + body.len()) as u32;

    let mut checksum_input = Vec::with_capacity(4 + body.len());
    checksum_input.extend_from_slice(&record_length.to_le_bytes());
    checksum_input.extend_from_slice(&body);
    let checksum = compute_checksum(&checksum_input);

    let mut frame = Vec::with_capacity(record_length as usize);
    frame.extend_from_slice(&record_length.to_le_bytes());
    frame.extend_from_slice(&body);
    frame.extend_from_slice(&checksum.to_le_bytes());
    frame
}

/// Deserializes one record from the front of `data`, verifying its checksum.
///
/// Returns the record and the number of bytes consumed.
pub(crate) fn decode_record<T: RecordEncoding>(data: &[u8]) -> LoreResult<(T, usize)> {
    let kind = T::kind();

    if data.len() < FRAME_BYTES {
        return Err(truncated(kind, data.len()));
    }

    let record_length = u32::from_le_bytes([data[0], data[1], data[2], data[3]]) as usize;
    if record_length < FRAME_BYTES || record_length > MAX_RECORD_BYTES {
        return Err(LoreError::serialization(format!(
            "invalid {} record length: {}",
            kind.as_str(),
            record_length
        )));
    }
    if data.len() < record_length {
        return Err(truncated(kind, data.len()));
    }

    let checksum_offset = record_length - 4;
    let stored_checksum = u32::from_le_bytes([
        data[checksum_offset],
        data[checksum_offset + 1],
        data[checksum_offset + 2],
        data[checksum_offset + 3],
    ]);
    if !verify_checksum(&data[..checksum_offset], stored_checksum) {
        return Err(LoreError::serialization(format!(
            "checksum mismatch in {} record",
            kind.as_str()
        )));
    }

    let body = &data[4..checksum_offset];
    let mut cursor = Cursor::new(body);
    let record = T::decode_body(&mut cursor).map_err(|e| {
        LoreError::serialization(format!(
            "undecodable {} record body: {}",
            kind.as_str(),
            e
        ))
    })?;
    if (cursor.position() as usize) != body.len() {
        return Err(LoreError::serialization(format!(
            "trailing bytes in {} record body",
            kind.as_str()
        )));
    }

    Ok((record, record_length))
}

fn truncated(kind: RecordKind, len: usize) -> LoreError {
    LoreError::serialization(format!(
        "truncated {} record ({} bytes remaining)",
        kind.as_str(),
        len
    ))
}

fn put_string(buf: &mut Vec<u8>, s: &str) {
    buf.extend_from_slice(&(s.len() as u32).to_le_bytes());
    buf.extend_from_slice(s.as_bytes());
}

fn read_string(cursor: &mut Cursor<&[u8]>) -> io::Result<String> {
    let mut len = [0u8; 4];
    cursor.read_exact(&mut len)?;
    let len = u32::from_le_bytes(len) as usize;

    let mut bytes = vec![0u8; len];
    cursor.read_exact(&mut bytes)?;

    String::from_utf8(bytes)
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, format!("invalid UTF-8: {}", e)))
}
