//! The command surface clients use to drive the coordinator.
//!
//! Custom commands travel as a name plus a key/value bag so that the wire
//! shape stays stable while the typed requests evolve. Transport controls are
//! plain enum variants.

use std::collections::BTreeMap;
use std::time::Duration;

use thiserror::Error;

use crate::library::FolderId;

pub const SET_FOLDER: &str = "set_folder";
pub const RESTORE_IF_EMPTY: &str = "restore_if_empty";

pub const ARG_FOLDER: &str = "folder";
pub const ARG_FORCE_REFRESH: &str = "force_refresh";
pub const ARG_START_INDEX: &str = "start_index";
pub const ARG_PLAY_WHEN_READY: &str = "play_when_ready";
pub const ARG_START_POSITION_MS: &str = "start_position_ms";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArgValue {
    Str(String),
    Bool(bool),
    Int(i64),
}

impl From<&str> for ArgValue {
    fn from(v: &str) -> Self {
        Self::Str(v.to_string())
    }
}

impl From<String> for ArgValue {
    fn from(v: String) -> Self {
        Self::Str(v)
    }
}

impl From<bool> for ArgValue {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

impl From<i64> for ArgValue {
    fn from(v: i64) -> Self {
        Self::Int(v)
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CommandError {
    #[error("unknown command {0:?}")]
    Unknown(String),
    #[error("missing argument {0:?}")]
    Missing(&'static str),
    #[error("argument {key:?} should be {expected}")]
    WrongType {
        key: &'static str,
        expected: &'static str,
    },
}

/// A named command with its argument bag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionCommand {
    pub action: String,
    pub args: BTreeMap<String, ArgValue>,
}

impl SessionCommand {
    pub fn new(action: impl Into<String>) -> Self {
        Self {
            action: action.into(),
            args: BTreeMap::new(),
        }
    }

    pub fn with(mut self, key: &str, value: impl Into<ArgValue>) -> Self {
        self.args.insert(key.to_string(), value.into());
        self
    }

    pub fn restore_if_empty() -> Self {
        Self::new(RESTORE_IF_EMPTY)
    }

    fn str_arg(&self, key: &'static str) -> Result<Option<&str>, CommandError> {
        match self.args.get(key) {
            None => Ok(None),
            Some(ArgValue::Str(s)) => Ok(Some(s)),
            Some(_) => Err(CommandError::WrongType {
                key,
                expected: "a string",
            }),
        }
    }

    fn bool_arg(&self, key: &'static str) -> Result<Option<bool>, CommandError> {
        match self.args.get(key) {
            None => Ok(None),
            Some(ArgValue::Bool(b)) => Ok(Some(*b)),
            Some(_) => Err(CommandError::WrongType {
                key,
                expected: "a boolean",
            }),
        }
    }

    fn int_arg(&self, key: &'static str) -> Result<Option<i64>, CommandError> {
        match self.args.get(key) {
            None => Ok(None),
            Some(ArgValue::Int(i)) => Ok(Some(*i)),
            Some(_) => Err(CommandError::WrongType {
                key,
                expected: "an integer",
            }),
        }
    }
}

/// Point the session at a folder and load it.
///
/// `start_index` and `start_position_ms` are taken as given and clamped when
/// the catalog is known.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SetFolderRequest {
    pub folder: FolderId,
    pub force_refresh: bool,
    pub start_index: i64,
    pub play_when_ready: bool,
    pub start_position_ms: i64,
}

impl SetFolderRequest {
    pub fn new(folder: FolderId) -> Self {
        Self {
            folder,
            force_refresh: false,
            start_index: 0,
            play_when_ready: true,
            start_position_ms: 0,
        }
    }

    pub fn to_command(&self) -> SessionCommand {
        SessionCommand::new(SET_FOLDER)
            .with(ARG_FOLDER, self.folder.as_str())
            .with(ARG_FORCE_REFRESH, self.force_refresh)
            .with(ARG_START_INDEX, self.start_index)
            .with(ARG_PLAY_WHEN_READY, self.play_when_ready)
            .with(ARG_START_POSITION_MS, self.start_position_ms)
    }

    fn from_command(cmd: &SessionCommand) -> Result<Self, CommandError> {
        let folder = cmd
            .str_arg(ARG_FOLDER)?
            .ok_or(CommandError::Missing(ARG_FOLDER))?;
        let defaults = Self::new(FolderId::new(folder));
        Ok(Self {
            force_refresh: cmd
                .bool_arg(ARG_FORCE_REFRESH)?
                .unwrap_or(defaults.force_refresh),
            start_index: cmd.int_arg(ARG_START_INDEX)?.unwrap_or(defaults.start_index),
            play_when_ready: cmd
                .bool_arg(ARG_PLAY_WHEN_READY)?
                .unwrap_or(defaults.play_when_ready),
            start_position_ms: cmd
                .int_arg(ARG_START_POSITION_MS)?
                .unwrap_or(defaults.start_position_ms),
            ..defaults
        })
    }
}

/// A decoded custom command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionRequest {
    SetFolder(SetFolderRequest),
    RestoreIfEmpty,
}

impl TryFrom<&SessionCommand> for SessionRequest {
    type Error = CommandError;

    fn try_from(cmd: &SessionCommand) -> Result<Self, Self::Error> {
        match cmd.action.as_str() {
            SET_FOLDER => SetFolderRequest::from_command(cmd).map(Self::SetFolder),
            RESTORE_IF_EMPTY => Ok(Self::RestoreIfEmpty),
            other => Err(CommandError::Unknown(other.to_string())),
        }
    }
}

/// Direct player controls, no-ops while nothing is loaded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transport {
    /// Prepare if needed, then play.
    Play,
    Pause,
    Stop,
    SeekTo(Duration),
    SeekToIndex(usize, Duration),
    Next,
}
