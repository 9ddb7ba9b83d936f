use bytes::{BufMut, Bytes, BytesMut};

use crate::error::{PacketError, Result};
use crate::packet::{Direction, Kind, Packet, Value};

/// Leading byte of host-to-servo frames.
pub const REQUEST_MARKER: u8 = b'#';

/// Leading byte of servo-to-host frames.
pub const REPLY_MARKER: u8 = b'*';

/// Frame terminator on the wire.
pub const TERMINATOR: &[u8] = b"\r";

/// Command token of a bare `Q` (status query).
const STATUS_QUERY: &str = "Q";

/// Query replies whose payload may be text (model string, firmware, serial
/// number). Checked in this order; the first prefix that matches wins.
const STRING_PAYLOAD_PREFIXES: [&str; 3] = ["MS", "F", "N"];

/// Append `#<device_id><command>\r` to `dst`.
///
/// `command` is written verbatim, kind letter and value included (`QD`,
/// `CLED0`, `D900T1500`).
pub fn encode_command(device_id: u32, command: &str, dst: &mut BytesMut) {
    let id = device_id.to_string();
    dst.reserve(1 + id.len() + command.len() + TERMINATOR.len());
    dst.put_u8(REQUEST_MARKER);
    dst.put_slice(id.as_bytes());
    dst.put_slice(command.as_bytes());
    dst.put_slice(TERMINATOR);
}

/// Encode a request frame: `#<device_id><command>\r`.
pub fn encode(device_id: u32, command: &str) -> Bytes {
    let mut buf = BytesMut::new();
    encode_command(device_id, command, &mut buf);
    buf.freeze()
}

/// Decode one frame into a [`Packet`].
///
/// Grammar, letters case-insensitive:
///
/// ```text
/// <# | *> <digits> [Q | C] <letters> [-][digits] <trailing>
/// ```
///
/// A single trailing CR is ignored. Trailing text is only accepted on query
/// replies for the text-valued commands (`MS`, `F`, `N`), where the grammar
/// splits a value like `LSS-HT1` across the command letters and the
/// trailing text. Commands missing from the table decode with
/// `known == false`.
pub fn decode(raw: &[u8]) -> Result<Packet> {
    let raw = raw.strip_suffix(TERMINATOR).unwrap_or(raw);
    let mut scanner = Scanner::new(raw);

    let direction = match scanner.next() {
        Some(REQUEST_MARKER) => Direction::Request,
        Some(REPLY_MARKER) => Direction::Reply,
        _ => return Err(PacketError::InvalidFrame("expected '#' or '*' marker")),
    };

    let id_digits = scanner.take_while(|b| b.is_ascii_digit());
    if id_digits.is_empty() {
        return Err(PacketError::InvalidFrame("missing device id"));
    }
    let device_id: u32 = ascii(id_digits)
        .parse()
        .map_err(|_| PacketError::InvalidFrame("device id out of range"))?;

    let kind = match scanner.peek().map(|b| b.to_ascii_uppercase()) {
        Some(b'Q') => {
            scanner.bump();
            Kind::Query
        }
        Some(b'C') => {
            scanner.bump();
            Kind::Config
        }
        _ => Kind::Action,
    };

    let letters = ascii(scanner.take_while(|b| b.is_ascii_alphabetic()));
    let negative = scanner.eat(b'-');
    let digits = ascii(scanner.take_while(|b| b.is_ascii_digit()));
    let rest = scanner.rest();
    if !rest.is_ascii() {
        return Err(PacketError::GarbledPayload(rest.escape_ascii().to_string()));
    }
    let mut trailing = ascii(rest);

    let mut command = letters.to_ascii_uppercase();
    if kind == Kind::Query && command.is_empty() {
        command = STATUS_QUERY.to_string();
    }

    let number = if digits.is_empty() {
        if negative {
            // A lone sign is not a number; leave it for the text rules.
            trailing.insert(0, '-');
        }
        None
    } else if negative {
        Some(format!("-{digits}"))
    } else {
        Some(digits)
    };

    let value = if !trailing.is_empty() {
        let Some(prefix) = string_payload_prefix(direction, kind, &command) else {
            return Err(PacketError::GarbledPayload(trailing));
        };
        let mut text = letters[prefix.len()..].to_string();
        if let Some(number) = &number {
            text.push_str(number);
        }
        text.push_str(&trailing);
        command = prefix.to_string();
        Some(Value::Text(text))
    } else {
        match number {
            Some(number) => Some(Value::Int(
                number
                    .parse()
                    .map_err(|_| PacketError::GarbledPayload(number))?,
            )),
            None => None,
        }
    };

    Ok(Packet::new(device_id, direction, kind, command, value))
}

fn string_payload_prefix(direction: Direction, kind: Kind, command: &str) -> Option<&'static str> {
    if direction != Direction::Reply || kind != Kind::Query {
        return None;
    }
    STRING_PAYLOAD_PREFIXES
        .into_iter()
        .find(|prefix| command.starts_with(prefix))
}

/// Bytes already checked to be ASCII.
fn ascii(bytes: &[u8]) -> String {
    bytes.iter().map(|&b| b as char).collect()
}

/// Forward-only cursor over one frame.
struct Scanner<'a> {
    input: &'a [u8],
    pos: usize,
}

impl<'a> Scanner<'a> {
    fn new(input: &'a [u8]) -> Self {
        Self { input, pos: 0 }
    }

    fn peek(&self) -> Option<u8> {
        self.input.get(self.pos).copied()
    }

    fn bump(&mut self) {
        self.pos += 1;
    }

    fn next(&mut self) -> Option<u8> {
        let b = self.peek()?;
        self.bump();
        Some(b)
    }

    fn eat(&mut self, expected: u8) -> bool {
        if self.peek() == Some(expected) {
            self.bump();
            true
        } else {
            false
        }
    }

    fn take_while(&mut self, pred: impl Fn(u8) -> bool) -> &'a [u8] {
        let start = self.pos;
        while self.peek().is_some_and(&pred) {
            self.bump();
        }
        &self.input[start..self.pos]
    }

    fn rest(&self) -> &'a [u8] {
        &self.input[self.pos..]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::UNKNOWN_DESCRIPTION;

    fn text(s: &str) -> Option<Value> {
        Some(Value::Text(s.to_string()))
    }

    #[test]
    fn encode_request() {
        assert_eq!(encode(12, "D521").as_ref(), b"#12D521\r");
        assert_eq!(encode(0, "QD").as_ref(), b"#0QD\r");
        assert_eq!(encode(254, "").as_ref(), b"#254\r");
    }

    #[test]
    fn encode_appends_to_buffer() {
        let mut buf = BytesMut::new();
        encode_command(1, "L", &mut buf);
        encode_command(2, "H", &mut buf);
        assert_eq!(buf.as_ref(), b"#1L\r#2H\r");
    }

    #[test]
    fn decode_action_request() {
        let p = decode(b"#12D521").unwrap();
        assert_eq!(p.device_id, 12);
        assert_eq!(p.direction, Direction::Request);
        assert_eq!(p.kind, Kind::Action);
        assert_eq!(p.command, "D");
        assert_eq!(p.value, Some(Value::Int(521)));
        assert!(p.known);
        assert_eq!(p.description, "Position in Degrees");
    }

    #[test]
    fn decode_model_string_reply() {
        let p = decode(b"*12QMSLSS-HT1").unwrap();
        assert_eq!(p.direction, Direction::Reply);
        assert_eq!(p.kind, Kind::Query);
        assert_eq!(p.command, "MS");
        assert_eq!(p.value, text("LSS-HT1"));
        assert!(p.known);
    }

    #[test]
    fn decode_position_reply() {
        let p = decode(b"*12QD980").unwrap();
        assert_eq!(p.command, "D");
        assert_eq!(p.value, Some(Value::Int(980)));
    }

    #[test]
    fn decode_negative_position_reply() {
        let p = decode(b"*19QD-1190").unwrap();
        assert_eq!(p.device_id, 19);
        assert_eq!(p.command, "D");
        assert_eq!(p.value, Some(Value::Int(-1190)));
    }

    #[test]
    fn decode_speed_reply() {
        let p = decode(b"*19QS900").unwrap();
        assert_eq!(p.command, "S");
        assert_eq!(p.value, Some(Value::Int(900)));
        assert!(p.known);
    }

    #[test]
    fn decode_config_request() {
        let p = decode(b"#5CLED0").unwrap();
        assert_eq!(p.kind, Kind::Config);
        assert_eq!(p.command, "LED");
        assert_eq!(p.value, Some(Value::Int(0)));
    }

    #[test]
    fn decode_command_without_value() {
        let p = decode(b"#3L").unwrap();
        assert_eq!(p.command, "L");
        assert_eq!(p.value, None);
        assert_eq!(p.description, "Limp");
    }

    #[test]
    fn decode_status_query() {
        let p = decode(b"#0Q").unwrap();
        assert_eq!(p.kind, Kind::Query);
        assert_eq!(p.command, "Q");
        assert_eq!(p.value, None);
        assert!(p.known);

        let p = decode(b"*0Q6").unwrap();
        assert_eq!(p.command, "Q");
        assert_eq!(p.value, Some(Value::Int(6)));
    }

    #[test]
    fn decode_is_case_insensitive() {
        let p = decode(b"#12qd").unwrap();
        assert_eq!(p.kind, Kind::Query);
        assert_eq!(p.command, "D");
    }

    #[test]
    fn decode_strips_one_terminator() {
        let p = decode(b"*1QV11950\r").unwrap();
        assert_eq!(p.command, "V");
        assert_eq!(p.value, Some(Value::Int(11950)));
    }

    #[test]
    fn decode_firmware_and_serial_text() {
        let p = decode(b"*5QF3.68").unwrap();
        assert_eq!(p.command, "F");
        assert_eq!(p.value, text("3.68"));

        let p = decode(b"*5QNA1B2").unwrap();
        assert_eq!(p.command, "N");
        assert_eq!(p.value, text("A1B2"));
    }

    #[test]
    fn decode_numeric_firmware_stays_integer() {
        let p = decode(b"*5QF368").unwrap();
        assert_eq!(p.command, "F");
        assert_eq!(p.value, Some(Value::Int(368)));
    }

    #[test]
    fn text_value_keeps_case() {
        let p = decode(b"*1qmsLss-Ht1").unwrap();
        assert_eq!(p.command, "MS");
        assert_eq!(p.value, text("Lss-Ht1"));
    }

    #[test]
    fn model_prefix_checked_before_firmware() {
        // "MSF..." must resolve to MS, not fall through to F.
        let p = decode(b"*1QMSFOO-X").unwrap();
        assert_eq!(p.command, "MS");
        assert_eq!(p.value, text("FOO-X"));
    }

    #[test]
    fn unknown_command_decodes() {
        let p = decode(b"*7QZZ12").unwrap();
        assert_eq!(p.command, "ZZ");
        assert_eq!(p.value, Some(Value::Int(12)));
        assert!(!p.known);
        assert_eq!(p.description, UNKNOWN_DESCRIPTION);
    }

    #[test]
    fn garbage_after_value_rejected() {
        let err = decode(b"*1QD100X").unwrap_err();
        assert!(matches!(err, PacketError::GarbledPayload(ref t) if t == "X"));

        let err = decode(b"#1D100.5").unwrap_err();
        assert!(matches!(err, PacketError::GarbledPayload(_)));
    }

    #[test]
    fn text_rule_only_applies_to_query_replies() {
        assert!(matches!(
            decode(b"#1QMSLSS-HT1"),
            Err(PacketError::GarbledPayload(_))
        ));
        assert!(matches!(
            decode(b"*1MSLSS-HT1"),
            Err(PacketError::GarbledPayload(_))
        ));
    }

    #[test]
    fn lone_sign_is_not_a_value() {
        let err = decode(b"#1G-").unwrap_err();
        assert!(matches!(err, PacketError::GarbledPayload(ref t) if t == "-"));

        let p = decode(b"#1G-1").unwrap();
        assert_eq!(p.value, Some(Value::Int(-1)));
    }

    #[test]
    fn value_overflow_rejected() {
        let err = decode(b"*1QD99999999999999999999").unwrap_err();
        assert!(matches!(err, PacketError::GarbledPayload(_)));
    }

    #[test]
    fn invalid_frames() {
        for raw in [
            &b""[..],
            b"\r",
            b"12D5",
            b"#D5",
            b"*",
            b"!1D5",
            b"#99999999999D1",
        ] {
            assert!(
                matches!(decode(raw), Err(PacketError::InvalidFrame(_))),
                "{raw:?} should be rejected"
            );
        }
    }

    #[test]
    fn encode_decode_recovers_id_and_command() {
        for (id, command, expected) in [
            (12, "D521", "D"),
            (0, "QD", "D"),
            (254, "CLED3", "LED"),
            (7, "L", "L"),
            (1, "MD-900", "MD"),
            (3, "Q", "Q"),
        ] {
            let p = decode(&encode(id, command)).unwrap();
            assert_eq!(p.device_id, id);
            assert_eq!(p.direction, Direction::Request);
            assert_eq!(p.command, expected);
        }
    }

    #[test]
    fn non_ascii_text_payload_is_garbled() {
        let err = decode(b"*1QMSLSS-\xffHT1").unwrap_err();
        assert!(matches!(err, PacketError::GarbledPayload(ref s) if s == "\\xffHT1"));

        let err = decode(b"*1QD12\xc3\xa9").unwrap_err();
        assert!(matches!(err, PacketError::GarbledPayload(_)));
    }

    #[test]
    fn decode_is_idempotent() {
        let raw = b"*12QMSLSS-HT1";
        assert_eq!(decode(raw).unwrap(), decode(raw).unwrap());
    }

    #[test]
    fn display_matches_input() {
        for raw in ["*12QD-1190", "#5CLED0", "*12QMSLSS-HT1", "#0Q", "#3L"] {
            assert_eq!(decode(raw.as_bytes()).unwrap().to_string(), raw);
        }
    }
}
