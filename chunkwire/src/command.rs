//! Text command protocol of the control channel.
//!
//! Requests are short ASCII datagrams, optionally terminated by CR/LF:
//!
//! ```text
//! LedOn
//! LedOff
//! Transfer
//! Transfer <port>
//! ```
//!
//! Every request is answered with exactly one [`Reply`].

use core::fmt;

const LED_ON: &[u8] = b"LedOn";
const LED_OFF: &[u8] = b"LedOff";
const TRANSFER: &[u8] = b"Transfer";

/// A parsed control request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// Drive the output pin high.
    LedOn,

    /// Drive the output pin low.
    LedOff,

    /// Stream the byte source to the requester.
    ///
    /// `port` is the transfer channel port; `None` selects the default.
    Transfer {
        /// Explicit destination port, `1..=65535`.
        port: Option<u16>,
    },
}

/// Why a control datagram was not understood.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseError {
    /// Not a recognized command.
    UnknownCommand,

    /// `Transfer` with a port that is not a decimal in `1..=65535`.
    MalformedPort,
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseError::UnknownCommand => write!(f, "Unknown command"),
            ParseError::MalformedPort => write!(f, "Malformed transfer port"),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for ParseError {}

impl Command {
    /// Parses one raw control datagram.
    ///
    /// Trailing CR/LF bytes are ignored. `LedOn` and `LedOff` must match
    /// exactly. `Transfer` may be followed by whitespace and a decimal port.
    pub fn parse(raw: &[u8]) -> Result<Self, ParseError> {
        let text = trim_line_end(raw);

        if text == LED_ON {
            return Ok(Command::LedOn);
        }
        if text == LED_OFF {
            return Ok(Command::LedOff);
        }

        let Some(rest) = text.strip_prefix(TRANSFER) else {
            return Err(ParseError::UnknownCommand);
        };
        if rest.is_empty() {
            return Ok(Command::Transfer { port: None });
        }
        // The port must be separated from the keyword.
        if !rest[0].is_ascii_whitespace() {
            return Err(ParseError::UnknownCommand);
        }

        let arg = rest.trim_ascii();
        if arg.is_empty() {
            return Ok(Command::Transfer { port: None });
        }
        parse_port(arg).map(|port| Command::Transfer { port: Some(port) })
    }

    /// Resolves the transfer port of a `Transfer` command.
    pub fn transfer_port(&self, default_port: u16) -> Option<u16> {
        match self {
            Command::Transfer { port } => Some(port.unwrap_or(default_port)),
            _ => None,
        }
    }
}

/// Writes the request exactly as it goes on the wire, without line ending.
impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Command::LedOn => write!(f, "LedOn"),
            Command::LedOff => write!(f, "LedOff"),
            Command::Transfer { port: None } => write!(f, "Transfer"),
            Command::Transfer { port: Some(port) } => write!(f, "Transfer {}", port),
        }
    }
}

fn trim_line_end(mut raw: &[u8]) -> &[u8] {
    while let [head @ .., b'\r' | b'\n'] = raw {
        raw = head;
    }
    raw
}

fn parse_port(arg: &[u8]) -> Result<u16, ParseError> {
    if arg.is_empty() || !arg.iter().all(u8::is_ascii_digit) {
        return Err(ParseError::MalformedPort);
    }

    let mut value: u32 = 0;
    for digit in arg {
        value = value * 10 + (digit - b'0') as u32;
        if value > u16::MAX as u32 {
            return Err(ParseError::MalformedPort);
        }
    }

    match value {
        0 => Err(ParseError::MalformedPort),
        port => Ok(port as u16),
    }
}

/// Status sent back to the issuer of a command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reply {
    /// Command executed.
    Ok,

    /// Command rejected or failed.
    Err,
}

impl Reply {
    /// Returns the reply datagram payload.
    pub const fn as_bytes(&self) -> &'static [u8] {
        match self {
            Reply::Ok => b"OK\n",
            Reply::Err => b"ERR\n",
        }
    }

    /// Parses a reply datagram received by a client.
    pub fn parse(raw: &[u8]) -> Option<Self> {
        match raw.trim_ascii() {
            b"OK" => Some(Reply::Ok),
            b"ERR" => Some(Reply::Err),
            _ => None,
        }
    }

    /// Returns true for [`Reply::Ok`].
    pub const fn is_ok(&self) -> bool {
        matches!(self, Reply::Ok)
    }
}

impl fmt::Display for Reply {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Reply::Ok => write!(f, "OK"),
            Reply::Err => write!(f, "ERR"),
        }
    }
}
