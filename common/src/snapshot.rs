use std::fmt;

use bincode::{
    config::standard,
    serde::{decode_from_slice, encode_to_vec},
};

use crate::handler::MazeHandler;

pub const MAGIC: [u8; 4] = *b"PMZ1";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SnapshotError {
    BadMagic,
    Malformed,
    Inconsistent(&'static str),
    Encode(String),
}

impl fmt::Display for SnapshotError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SnapshotError::BadMagic => write!(f, "not a maze snapshot"),
            SnapshotError::Malformed => write!(f, "snapshot data is malformed"),
            SnapshotError::Inconsistent(reason) => write!(f, "snapshot is inconsistent: {}", reason),
            SnapshotError::Encode(reason) => write!(f, "failed to encode snapshot: {}", reason),
        }
    }
}

impl std::error::Error for SnapshotError {}

/// Encodes the whole handler, history included, so undo keeps working after
/// the snapshot is restored.
pub fn encode(handler: &MazeHandler) -> Result<Vec<u8>, SnapshotError> {
    let body =
        encode_to_vec(handler, standard()).map_err(|e| SnapshotError::Encode(e.to_string()))?;

    let mut bytes = Vec::with_capacity(MAGIC.len() + body.len());
    bytes.extend_from_slice(&MAGIC);
    bytes.extend_from_slice(&body);
    Ok(bytes)
}

pub fn decode(bytes: &[u8]) -> Result<MazeHandler, SnapshotError> {
    let Some(body) = bytes.strip_prefix(&MAGIC) else {
        return Err(SnapshotError::BadMagic);
    };

    let (handler, read) = decode_from_slice::<MazeHandler, _>(body, standard())
        .map_err(|_| SnapshotError::Malformed)?;

    if read != body.len() {
        return Err(SnapshotError::Malformed);
    }

    handler
        .check_invariants()
        .and_then(|()| handler.check_history())
        .map_err(SnapshotError::Inconsistent)?;

    Ok(handler)
}
