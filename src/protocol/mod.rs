//! Protocol Module
//!
//! The line-oriented command surface used by the interactive session.
//!
//! ## Request Format
//! ```text
//! <key>            look up key
//! <key> <value>    set key to value
//! exit             close the store and quit
//! ```
//! Keys are decimal integers in `[0, 65535]`, values in `[0, 4294967295]`.
//! The first number must start at column 0.
//!
//! ## Response Format
//! ```text
//! result: <value>  lookup hit
//! result: null     lookup miss
//! ok               set applied
//! error: <reason>  recoverable input error
//! ```

mod codec;
mod command;
mod response;

pub use codec::{decode_command, encode_response};
pub use command::{Command, CommandType};
pub use response::Response;
