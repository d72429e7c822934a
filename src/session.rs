//! Interactive Session
//!
//! Reads commands line by line and answers each one against a store.

use std::io::{BufRead, Write};

use crate::error::Result;
use crate::protocol::{decode_command, encode_response, Command, Response};
use crate::store::Store;

/// Prompt printed before every command
pub const PROMPT: &str = "\"exit\", \"x\" to retrieve the value mapped to x, or \"x y\" to map x -> y";

/// How a session ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEnd {
    /// The user typed `exit`
    Exit,

    /// Input reached end of file
    Eof,
}

/// Drives one store from a line reader, writing replies to `writer`
pub struct Session<R, W> {
    reader: R,
    writer: W,

    /// Print `PROMPT` before each command
    prompt: bool,
}

impl<R: BufRead, W: Write> Session<R, W> {
    /// Create a new session
    pub fn new(reader: R, writer: W) -> Self {
        Self {
            reader,
            writer,
            prompt: true,
        }
    }

    /// Enable or disable the prompt line
    pub fn with_prompt(mut self, prompt: bool) -> Self {
        self.prompt = prompt;
        self
    }

    /// Run until `exit`, end of input, or a fatal error
    ///
    /// Recoverable errors (bad input, out-of-range numbers) are reported on
    /// the writer and the loop continues. Fatal errors are returned; the
    /// caller still owns the store and is responsible for closing it.
    pub fn run(&mut self, store: &mut Store) -> Result<SessionEnd> {
        let mut line = String::new();

        loop {
            if self.prompt {
                writeln!(self.writer, "{}", PROMPT)?;
                self.writer.flush()?;
            }

            line.clear();
            if self.reader.read_line(&mut line)? == 0 {
                tracing::debug!("Input closed");
                return Ok(SessionEnd::Eof);
            }

            let command = match decode_command(&line) {
                Ok(cmd) => cmd,
                Err(e) => {
                    self.send_response(&Response::error(e.to_string()))?;
                    continue;
                }
            };

            tracing::trace!("Received command: {:?}", command);

            let result = match command {
                Command::Exit => return Ok(SessionEnd::Exit),
                Command::Get { key } => store.get(key).map(Response::lookup),
                Command::Set { key, value } => store.set(key, value).map(|_| Response::Stored),
            };

            let response = match result {
                Ok(response) => response,
                Err(e) if !e.is_fatal() => Response::error(e.to_string()),
                Err(e) => {
                    tracing::error!("Fatal store error: {}", e);
                    return Err(e);
                }
            };

            self.send_response(&response)?;
        }
    }

    /// Write a response line
    fn send_response(&mut self, response: &Response) -> Result<()> {
        writeln!(self.writer, "{}", encode_response(response))?;
        self.writer.flush()?;
        Ok(())
    }

    /// Consume the session, returning the writer
    pub fn into_writer(self) -> W {
        self.writer
    }
}
