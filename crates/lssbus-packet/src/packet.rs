use std::fmt;

use bytes::{BufMut, Bytes, BytesMut};

use crate::codec::{REPLY_MARKER, REQUEST_MARKER, TERMINATOR};
use crate::command::{describe, UNKNOWN_DESCRIPTION};

/// Who sent the frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    /// Host to servo (`#`).
    Request,
    /// Servo to host (`*`).
    Reply,
}

impl Direction {
    pub fn marker(self) -> u8 {
        match self {
            Direction::Request => REQUEST_MARKER,
            Direction::Reply => REPLY_MARKER,
        }
    }
}

/// Protocol sub-type of a command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Kind {
    /// Act now (no kind letter).
    #[default]
    Action,
    /// Read a parameter (`Q`).
    Query,
    /// Write a parameter to persistent config (`C`).
    Config,
}

impl Kind {
    /// The kind letter on the wire, if any.
    pub fn letter(self) -> Option<char> {
        match self {
            Kind::Action => None,
            Kind::Query => Some('Q'),
            Kind::Config => Some('C'),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Kind::Action => "action",
            Kind::Query => "query",
            Kind::Config => "config",
        }
    }
}

/// Packet payload, transported exactly as received.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Value {
    Int(i64),
    Text(String),
}

impl Value {
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(v) => Some(*v),
            Value::Text(_) => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Value::Int(_) => None,
            Value::Text(s) => Some(s),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Int(v) => write!(f, "{v}"),
            Value::Text(s) => f.write_str(s),
        }
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Int(v)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Text(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Text(s)
    }
}

/// One decoded frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Packet {
    pub device_id: u32,
    pub direction: Direction,
    pub kind: Kind,
    /// Uppercase command token, e.g. `D`, `LED`, `MS`.
    pub command: String,
    pub value: Option<Value>,
    /// Whether `command` is in the command table.
    pub known: bool,
    /// Table description, or [`UNKNOWN_DESCRIPTION`].
    pub description: &'static str,
}

impl Packet {
    /// Build a packet, filling `known` and `description` from the command table.
    pub fn new(
        device_id: u32,
        direction: Direction,
        kind: Kind,
        command: impl Into<String>,
        value: Option<Value>,
    ) -> Self {
        let command = command.into();
        let (known, description) = match describe(&command) {
            Some(description) => (true, description),
            None => (false, UNKNOWN_DESCRIPTION),
        };
        Self {
            device_id,
            direction,
            kind,
            command,
            value,
            known,
            description,
        }
    }

    /// A host-to-servo request.
    pub fn request(
        device_id: u32,
        kind: Kind,
        command: impl Into<String>,
        value: Option<Value>,
    ) -> Self {
        Self::new(device_id, Direction::Request, kind, command, value)
    }

    /// Wire form of this packet, terminator included.
    pub fn to_frame(&self) -> Bytes {
        let text = self.to_string();
        let mut buf = BytesMut::with_capacity(text.len() + TERMINATOR.len());
        buf.put_slice(text.as_bytes());
        buf.put_slice(TERMINATOR);
        buf.freeze()
    }
}

/// Wire form without the terminator: `*12QD980`, `#0Q`.
impl fmt::Display for Packet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.direction.marker() as char, self.device_id)?;
        if let Some(letter) = self.kind.letter() {
            write!(f, "{letter}")?;
        }
        // A bare status query is just the kind letter.
        if !(self.kind == Kind::Query && self.command == "Q") {
            f.write_str(&self.command)?;
        }
        if let Some(value) = &self.value {
            write!(f, "{value}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_fills_table_fields() {
        let p = Packet::request(3, Kind::Action, "LED", Some(Value::Int(2)));
        assert!(p.known);
        assert_eq!(p.description, "LED Color");

        let p = Packet::request(3, Kind::Action, "XYZ", None);
        assert!(!p.known);
        assert_eq!(p.description, UNKNOWN_DESCRIPTION);
    }

    #[test]
    fn display_wire_form() {
        let p = Packet::new(12, Direction::Reply, Kind::Query, "D", Some(Value::Int(-1190)));
        assert_eq!(p.to_string(), "*12QD-1190");

        let p = Packet::request(5, Kind::Config, "LED", Some(Value::Int(0)));
        assert_eq!(p.to_string(), "#5CLED0");

        let p = Packet::new(12, Direction::Reply, Kind::Query, "MS", Some("LSS-HT1".into()));
        assert_eq!(p.to_string(), "*12QMSLSS-HT1");
    }

    #[test]
    fn display_status_query() {
        let p = Packet::request(0, Kind::Query, "Q", None);
        assert_eq!(p.to_string(), "#0Q");
    }

    #[test]
    fn to_frame_appends_terminator() {
        let p = Packet::request(1, Kind::Action, "L", None);
        assert_eq!(p.to_frame().as_ref(), b"#1L\r");
    }

    #[test]
    fn value_accessors() {
        assert_eq!(Value::Int(7).as_int(), Some(7));
        assert_eq!(Value::Int(7).as_text(), None);
        assert_eq!(Value::from("abc").as_text(), Some("abc"));
        assert_eq!(Value::from("abc").as_int(), None);
    }
}
