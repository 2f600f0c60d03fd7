//! Binary serialization of report entries.
//!
//! Report definitions are cached as a 32-byte fixed header followed by a
//! bincode-encoded payload. Both raw and rewritten rules are stored, so a
//! cache written after a run can be reloaded without rewriting again.
//!
//! ## Wire Format
//!
//! ```text
//! Offset  Size  Field
//! 0       4     Magic bytes: b"DQRY"
//! 4       2     Format version (u16, little-endian)
//! 6       2     Engine version (u16, little-endian)
//! 8       4     Flags (u32, reserved)
//! 12      4     Payload length in bytes (u32, little-endian)
//! 16      16    BLAKE3 hash of the payload (truncated to 16 bytes)
//! 32..    var   Bincode-encoded payload
//! ```
//!
//! The format version must match exactly; the engine version is informational.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{
    CommitRef, Condition, Field, FieldKind, LogicalOp, Operator, RawRule, ReportEntry, Rule,
    Token, Value,
};

const MAGIC: &[u8; 4] = b"DQRY";
const FORMAT_VERSION: u16 = 1;
const ENGINE_VERSION: u16 = 1;
const HEADER_SIZE: usize = 32;

/// Errors that can occur when serializing a [`ReportEntry`] to bytes.
#[derive(Debug, Error)]
pub enum SerializeError {
    #[error("failed to encode report entry: {0}")]
    Encode(#[from] bincode::error::EncodeError),

    #[error("I/O error during serialization: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors that can occur when deserializing a [`ReportEntry`] from bytes.
#[derive(Debug, Error)]
pub enum DeserializeError {
    #[error("not a docquery binary: invalid magic bytes")]
    BadMagic,

    #[error("incompatible format version: blob is v{blob}, engine supports v{supported}")]
    IncompatibleVersion { blob: u16, supported: u16 },

    #[error("integrity check failed: BLAKE3 checksum mismatch")]
    ChecksumMismatch,

    #[error("payload length mismatch: expected {expected} bytes, got {actual}")]
    LengthMismatch { expected: u32, actual: usize },

    #[error("failed to decode payload: {0}")]
    Decode(#[from] bincode::error::DecodeError),

    #[error("validation failed: {0}")]
    Validation(String),

    #[error("I/O error during deserialization: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Debug, Serialize, Deserialize)]
struct SerializedEntry {
    metadata: EntryMetadata,
    name: String,
    bounds: Option<String>,
    rules: Vec<SerializedRule>,
}

#[derive(Debug, Serialize, Deserialize)]
struct EntryMetadata {
    rule_count: usize,
    source_digest: Option<[u8; 32]>,
}

#[derive(Debug, Serialize, Deserialize)]
enum SerializedRule {
    Raw {
        condition: Vec<SerializedToken>,
        extension_scope: Option<String>,
        bounds: Option<String>,
    },
    Rewritten(Vec<SerializedToken>),
}

#[derive(Debug, Serialize, Deserialize)]
enum SerializedToken {
    Comparison {
        field: String,
        kind: SerializedKind,
        op: SerializedOp,
        literal: String,
        commit: Option<String>,
    },
    And,
    Or,
    Open,
    Close,
    Bool(bool),
    Error(String),
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
enum SerializedKind {
    Extension,
    Path,
    Enabled,
    FormField,
    Text,
    CaseText,
    Word,
    CaseWord,
    Version,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
enum SerializedOp {
    Eq,
    Neq,
    Lt,
    Lte,
    Gt,
    Gte,
}

fn serialize_kind(kind: FieldKind) -> SerializedKind {
    match kind {
        FieldKind::Extension => SerializedKind::Extension,
        FieldKind::Path => SerializedKind::Path,
        FieldKind::Enabled => SerializedKind::Enabled,
        FieldKind::FormField => SerializedKind::FormField,
        FieldKind::Text => SerializedKind::Text,
        FieldKind::CaseText => SerializedKind::CaseText,
        FieldKind::Word => SerializedKind::Word,
        FieldKind::CaseWord => SerializedKind::CaseWord,
        FieldKind::Version => SerializedKind::Version,
    }
}

fn deserialize_kind(kind: SerializedKind) -> FieldKind {
    match kind {
        SerializedKind::Extension => FieldKind::Extension,
        SerializedKind::Path => FieldKind::Path,
        SerializedKind::Enabled => FieldKind::Enabled,
        SerializedKind::FormField => FieldKind::FormField,
        SerializedKind::Text => FieldKind::Text,
        SerializedKind::CaseText => FieldKind::CaseText,
        SerializedKind::Word => FieldKind::Word,
        SerializedKind::CaseWord => FieldKind::CaseWord,
        SerializedKind::Version => FieldKind::Version,
    }
}

fn serialize_op(op: Operator) -> SerializedOp {
    match op {
        Operator::Equal => SerializedOp::Eq,
        Operator::NotEqual => SerializedOp::Neq,
        Operator::Less => SerializedOp::Lt,
        Operator::LessEqual => SerializedOp::Lte,
        Operator::More => SerializedOp::Gt,
        Operator::MoreEqual => SerializedOp::Gte,
    }
}

fn deserialize_op(op: SerializedOp) -> Operator {
    match op {
        SerializedOp::Eq => Operator::Equal,
        SerializedOp::Neq => Operator::NotEqual,
        SerializedOp::Lt => Operator::Less,
        SerializedOp::Lte => Operator::LessEqual,
        SerializedOp::Gt => Operator::More,
        SerializedOp::Gte => Operator::MoreEqual,
    }
}

fn serialize_condition(condition: &Condition) -> Vec<SerializedToken> {
    condition
        .iter()
        .map(|token| match token {
            Token::Comparison { field, op, value } => SerializedToken::Comparison {
                field: field.name().to_owned(),
                kind: serialize_kind(field.kind()),
                op: serialize_op(*op),
                literal: value.literal().to_owned(),
                commit: value.commit().map(|c| c.id().to_owned()),
            },
            Token::Logical(LogicalOp::And) => SerializedToken::And,
            Token::Logical(LogicalOp::Or) => SerializedToken::Or,
            Token::GroupOpen => SerializedToken::Open,
            Token::GroupClose => SerializedToken::Close,
            Token::Bool(v) => SerializedToken::Bool(*v),
            Token::Error(message) => SerializedToken::Error(message.clone()),
        })
        .collect()
}

fn deserialize_condition(tokens: Vec<SerializedToken>) -> Condition {
    tokens
        .into_iter()
        .map(|token| match token {
            SerializedToken::Comparison {
                field,
                kind,
                op,
                literal,
                commit,
            } => {
                let value = Value::new(literal);
                Token::Comparison {
                    field: Field::new(field, deserialize_kind(kind)),
                    op: deserialize_op(op),
                    value: match commit {
                        Some(id) => value.with_commit(CommitRef::new(id)),
                        None => value,
                    },
                }
            }
            SerializedToken::And => Token::Logical(LogicalOp::And),
            SerializedToken::Or => Token::Logical(LogicalOp::Or),
            SerializedToken::Open => Token::GroupOpen,
            SerializedToken::Close => Token::GroupClose,
            SerializedToken::Bool(v) => Token::Bool(v),
            SerializedToken::Error(message) => Token::Error(message),
        })
        .collect()
}

fn entry_to_serialized(entry: &ReportEntry, source_text: Option<&str>) -> SerializedEntry {
    let source_digest = source_text.map(|s| *blake3::hash(s.as_bytes()).as_bytes());

    let rules = entry
        .rules
        .iter()
        .map(|rule| match rule {
            Rule::Raw(raw) => SerializedRule::Raw {
                condition: serialize_condition(&raw.condition),
                extension_scope: raw.extension_scope.clone(),
                bounds: raw.bounds.clone(),
            },
            Rule::Rewritten(condition) => SerializedRule::Rewritten(serialize_condition(condition)),
        })
        .collect();

    SerializedEntry {
        metadata: EntryMetadata {
            rule_count: entry.rules.len(),
            source_digest,
        },
        name: entry.name.clone(),
        bounds: entry.bounds.clone(),
        rules,
    }
}

fn serialized_to_entry(ser: SerializedEntry) -> Result<ReportEntry, DeserializeError> {
    validate(&ser)?;

    let rules = ser
        .rules
        .into_iter()
        .map(|rule| match rule {
            SerializedRule::Raw {
                condition,
                extension_scope,
                bounds,
            } => Rule::Raw(RawRule {
                condition: deserialize_condition(condition),
                extension_scope,
                bounds,
            }),
            SerializedRule::Rewritten(tokens) => Rule::Rewritten(deserialize_condition(tokens)),
        })
        .collect();

    Ok(ReportEntry {
        name: ser.name,
        bounds: ser.bounds,
        rules,
    })
}

fn validate(ser: &SerializedEntry) -> Result<(), DeserializeError> {
    if ser.metadata.rule_count != ser.rules.len() {
        return Err(DeserializeError::Validation(format!(
            "metadata says {} rules but payload has {}",
            ser.metadata.rule_count,
            ser.rules.len()
        )));
    }

    for (index, rule) in ser.rules.iter().enumerate() {
        let tokens = match rule {
            SerializedRule::Raw { condition, .. } => condition,
            SerializedRule::Rewritten(tokens) => tokens,
        };
        for token in tokens {
            if let SerializedToken::Comparison { field, kind, .. } = token {
                validate_field(field, deserialize_kind(*kind), index)?;
            }
        }
    }

    Ok(())
}

/// Built-in kinds must carry their keyword; form fields must not collide with one.
fn validate_field(name: &str, kind: FieldKind, rule: usize) -> Result<(), DeserializeError> {
    let consistent = match kind.keyword() {
        Some(keyword) => name == keyword,
        None => FieldKind::from_keyword(name).is_none(),
    };
    if consistent {
        return Ok(());
    }
    Err(DeserializeError::Validation(format!(
        "rule #{rule}: field '{name}' does not match kind {kind:?}"
    )))
}

fn write_header(buf: &mut Vec<u8>, payload: &[u8]) {
    let hash = blake3::hash(payload);
    let hash_bytes = hash.as_bytes();

    buf.extend_from_slice(MAGIC);
    buf.extend_from_slice(&FORMAT_VERSION.to_le_bytes());
    buf.extend_from_slice(&ENGINE_VERSION.to_le_bytes());
    buf.extend_from_slice(&0u32.to_le_bytes()); // flags (reserved)
    #[allow(clippy::cast_possible_truncation)] // report entries stay far below 4 GiB
    let payload_len = payload.len() as u32;
    buf.extend_from_slice(&payload_len.to_le_bytes());
    buf.extend_from_slice(&hash_bytes[..16]);
}

#[allow(clippy::cast_possible_truncation)] // HEADER_SIZE is 32, always fits in u32
fn read_header(bytes: &[u8]) -> Result<(u16, u32, [u8; 16]), DeserializeError> {
    if bytes.len() < HEADER_SIZE {
        return Err(DeserializeError::LengthMismatch {
            expected: HEADER_SIZE as u32,
            actual: bytes.len(),
        });
    }

    if &bytes[0..4] != MAGIC {
        return Err(DeserializeError::BadMagic);
    }

    let format_version = u16::from_le_bytes([bytes[4], bytes[5]]);
    let payload_len = u32::from_le_bytes([bytes[12], bytes[13], bytes[14], bytes[15]]);

    let mut hash = [0u8; 16];
    hash.copy_from_slice(&bytes[16..32]);

    Ok((format_version, payload_len, hash))
}

fn checked_payload(bytes: &[u8]) -> Result<SerializedEntry, DeserializeError> {
    let (format_version, payload_len, stored_hash) = read_header(bytes)?;

    if format_version != FORMAT_VERSION {
        return Err(DeserializeError::IncompatibleVersion {
            blob: format_version,
            supported: FORMAT_VERSION,
        });
    }

    let payload_end = HEADER_SIZE + payload_len as usize;
    if bytes.len() < payload_end {
        return Err(DeserializeError::LengthMismatch {
            expected: payload_len,
            actual: bytes.len() - HEADER_SIZE,
        });
    }
    let payload = &bytes[HEADER_SIZE..payload_end];

    if blake3::hash(payload).as_bytes()[..16] != stored_hash {
        return Err(DeserializeError::ChecksumMismatch);
    }

    let (serialized, _): (SerializedEntry, usize) =
        bincode::serde::decode_from_slice(payload, bincode::config::standard())?;
    Ok(serialized)
}

pub(crate) fn encode(
    entry: &ReportEntry,
    source_text: Option<&str>,
) -> Result<Vec<u8>, SerializeError> {
    let serialized = entry_to_serialized(entry, source_text);
    let payload = bincode::serde::encode_to_vec(&serialized, bincode::config::standard())?;

    let mut buf = Vec::with_capacity(HEADER_SIZE + payload.len());
    write_header(&mut buf, &payload);
    buf.extend_from_slice(&payload);
    Ok(buf)
}

pub(crate) fn decode(bytes: &[u8]) -> Result<ReportEntry, DeserializeError> {
    serialized_to_entry(checked_payload(bytes)?)
}

/// Whether `bytes` hold a valid cache written from exactly `source_text`.
///
/// Callers use this to decide whether a cached entry must be rebuilt after
/// the report definition changed.
///
/// # Errors
///
/// Returns [`DeserializeError`] if `bytes` are not a valid cache.
pub fn is_fresh(bytes: &[u8], source_text: &str) -> Result<bool, DeserializeError> {
    let serialized = checked_payload(bytes)?;
    let digest = *blake3::hash(source_text.as_bytes()).as_bytes();
    Ok(serialized.metadata.source_digest == Some(digest))
}
