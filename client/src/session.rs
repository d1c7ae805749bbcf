use std::{fmt, fs, io, path::Path};

use tracing::info;

use common::handler::MazeHandler;
use common::snapshot::{self, SnapshotError};

#[derive(Debug)]
pub enum SessionError {
    Io(io::Error),
    Snapshot(SnapshotError),
}

impl fmt::Display for SessionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionError::Io(e) => write!(f, "save file error: {}", e),
            SessionError::Snapshot(e) => write!(f, "{}", e),
        }
    }
}

impl std::error::Error for SessionError {}

impl From<io::Error> for SessionError {
    fn from(e: io::Error) -> Self {
        SessionError::Io(e)
    }
}

impl From<SnapshotError> for SessionError {
    fn from(e: SnapshotError) -> Self {
        SessionError::Snapshot(e)
    }
}

pub fn save(path: &Path, handler: &MazeHandler) -> Result<(), SessionError> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }

    let bytes = snapshot::encode(handler)?;
    fs::write(path, bytes)?;

    info!(path = %path.display(), moves = handler.moves_made(), "session saved");
    Ok(())
}

pub fn load(path: &Path) -> Result<MazeHandler, SessionError> {
    let bytes = fs::read(path)?;
    let handler = snapshot::decode(&bytes)?;

    info!(path = %path.display(), moves = handler.moves_made(), "session loaded");
    Ok(handler)
}

/// Like `load`, but a missing save file is not an error.
pub fn load_if_present(path: &Path) -> Result<Option<MazeHandler>, SessionError> {
    match load(path) {
        Ok(handler) => Ok(Some(handler)),
        Err(SessionError::Io(e)) if e.kind() == io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(e),
    }
}

#[cfg(test)]
mod tests {
    use common::maze::{MazeDirection, Seed};

    use super::*;
    use crate::test_helpers::temp_path;

    #[test]
    fn saved_sessions_load_back_identically() {
        let path = temp_path("round-trip").join("nested").join("session.bin");
        let mut handler = MazeHandler::from_seed(Seed::new(8));
        handler.move_in(MazeDirection::Right);
        handler.move_in(MazeDirection::Down);

        save(&path, &handler).expect("save should succeed");
        let loaded = load(&path).expect("load should succeed");

        assert_eq!(loaded, handler);
        fs::remove_dir_all(temp_path("round-trip")).ok();
    }

    #[test]
    fn missing_save_file_is_not_an_error() {
        let path = temp_path("missing").join("session.bin");
        assert!(matches!(load_if_present(&path), Ok(None)));
    }

    #[test]
    fn corrupt_save_file_is_reported() {
        let directory = temp_path("corrupt");
        fs::create_dir_all(&directory).expect("temp dir should be writable");
        let path = directory.join("session.bin");
        fs::write(&path, b"garbage").expect("temp file should be writable");

        assert!(matches!(
            load_if_present(&path),
            Err(SessionError::Snapshot(SnapshotError::BadMagic))
        ));
        fs::remove_dir_all(directory).ok();
    }
}
