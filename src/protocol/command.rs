//! Command definitions
//!
//! Represents one parsed input line.

/// Command types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandType {
    Get,
    Set,
    Exit,
}

/// A parsed command
///
/// Numbers are already range-checked by the decoder.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// Look up a key
    Get { key: u32 },

    /// Insert or overwrite a key
    Set { key: u32, value: u32 },

    /// Close the store and end the session
    Exit,
}

impl Command {
    /// Get the command type
    pub fn command_type(&self) -> CommandType {
        match self {
            Command::Get { .. } => CommandType::Get,
            Command::Set { .. } => CommandType::Set,
            Command::Exit => CommandType::Exit,
        }
    }
}
