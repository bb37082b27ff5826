use crate::error::{LidmonError, Result};
use std::fmt;
use std::fs;
use std::path::Path;

/// Lid hinge position as reported by ACPI.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LidState {
    Open,
    Closed,
    Unknown,
}

impl LidState {
    fn from_token(token: &str) -> Self {
        match token {
            "open" => LidState::Open,
            "closed" => LidState::Closed,
            _ => LidState::Unknown,
        }
    }
}

impl fmt::Display for LidState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LidState::Open => write!(f, "open"),
            LidState::Closed => write!(f, "closed"),
            LidState::Unknown => write!(f, "unknown"),
        }
    }
}

/// Read the current lid state from the ACPI state file.
///
/// The file looks like `state:      open`. The state can change between
/// polls, so the file is re-read on every call. Fails with
/// [`LidmonError::LidStateNotFound`] when the file does not exist.
pub fn read_lid_state(path: &Path) -> Result<LidState> {
    if !path.exists() {
        return Err(LidmonError::LidStateNotFound(path.to_path_buf()));
    }

    let content = fs::read_to_string(path)?;
    Ok(parse_lid_state(&content))
}

fn parse_lid_state(content: &str) -> LidState {
    content
        .lines()
        .find(|line| line.contains("state:"))
        .and_then(|line| line.splitn(2, ':').nth(1))
        .map(|token| LidState::from_token(token.trim()))
        .unwrap_or(LidState::Unknown)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn parses_closed_state() {
        assert_eq!(parse_lid_state("state:      closed\n"), LidState::Closed);
    }

    #[test]
    fn parses_open_state() {
        assert_eq!(parse_lid_state("state:      open\n"), LidState::Open);
    }

    #[test]
    fn content_without_state_line_is_unknown() {
        assert_eq!(parse_lid_state("no such line here\n"), LidState::Unknown);
        assert_eq!(parse_lid_state(""), LidState::Unknown);
    }

    #[test]
    fn unrecognized_token_is_unknown() {
        assert_eq!(parse_lid_state("state:      ajar\n"), LidState::Unknown);
    }

    #[test]
    fn reads_state_from_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("state");
        fs::write(&path, "state:      open\n").unwrap();
        assert_eq!(read_lid_state(&path).unwrap(), LidState::Open);

        fs::write(&path, "state:      closed\n").unwrap();
        assert_eq!(read_lid_state(&path).unwrap(), LidState::Closed);
    }

    #[test]
    fn missing_file_is_not_found() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("absent");
        match read_lid_state(&path) {
            Err(LidmonError::LidStateNotFound(p)) => assert_eq!(p, path),
            other => panic!("expected LidStateNotFound, got {:?}", other),
        }
    }
}
