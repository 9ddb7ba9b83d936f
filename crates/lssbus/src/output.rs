use std::io::IsTerminal;

use clap::ValueEnum;
use comfy_table::{presets::UTF8_FULL, ContentArrangement, Table};
use lssbus_packet::{Direction, Packet, Value, COMMANDS, MODIFIERS};
use serde::Serialize;

#[derive(Clone, Debug, Copy, ValueEnum)]
pub enum OutputFormat {
    Json,
    Table,
    Pretty,
    Raw,
}

impl OutputFormat {
    pub fn default_for_stdout() -> Self {
        if std::io::stdout().is_terminal() {
            Self::Table
        } else {
            Self::Json
        }
    }
}

#[derive(Serialize)]
#[serde(untagged)]
enum ValueOutput<'a> {
    Int(i64),
    Text(&'a str),
}

#[derive(Serialize)]
struct PacketOutput<'a> {
    frame: String,
    device_id: u32,
    direction: &'static str,
    kind: &'static str,
    command: &'a str,
    value: Option<ValueOutput<'a>>,
    known: bool,
    description: &'static str,
}

impl<'a> From<&'a Packet> for PacketOutput<'a> {
    fn from(packet: &'a Packet) -> Self {
        Self {
            frame: packet.to_string(),
            device_id: packet.device_id,
            direction: direction_name(packet.direction),
            kind: packet.kind.as_str(),
            command: &packet.command,
            value: packet.value.as_ref().map(|value| match value {
                Value::Int(v) => ValueOutput::Int(*v),
                Value::Text(s) => ValueOutput::Text(s),
            }),
            known: packet.known,
            description: packet.description,
        }
    }
}

pub fn print_packet(packet: &Packet, format: OutputFormat) {
    print_packets(std::slice::from_ref(packet), format);
}

pub fn print_packets(packets: &[Packet], format: OutputFormat) {
    match format {
        OutputFormat::Json => {
            for packet in packets {
                print_json(&PacketOutput::from(packet));
            }
        }
        OutputFormat::Table => {
            let mut table = Table::new();
            table
                .load_preset(UTF8_FULL)
                .set_content_arrangement(ContentArrangement::Dynamic)
                .set_header(vec![
                    "ID",
                    "DIRECTION",
                    "KIND",
                    "COMMAND",
                    "VALUE",
                    "DESCRIPTION",
                ]);
            for packet in packets {
                table.add_row(vec![
                    packet.device_id.to_string(),
                    direction_name(packet.direction).to_string(),
                    packet.kind.as_str().to_string(),
                    packet.command.clone(),
                    value_text(packet),
                    packet.description.to_string(),
                ]);
            }
            println!("{table}");
        }
        OutputFormat::Pretty => {
            for packet in packets {
                println!(
                    "id={} direction={} kind={} command={} value={} ({})",
                    packet.device_id,
                    direction_name(packet.direction),
                    packet.kind.as_str(),
                    packet.command,
                    value_text(packet),
                    packet.description
                );
            }
        }
        OutputFormat::Raw => {
            for packet in packets {
                println!("{packet}");
            }
        }
    }
}

#[derive(Serialize)]
struct TableEntry {
    token: &'static str,
    description: &'static str,
}

#[derive(Serialize)]
struct CommandsOutput {
    commands: Vec<TableEntry>,
    modifiers: Vec<TableEntry>,
}

pub fn print_commands(format: OutputFormat) {
    match format {
        OutputFormat::Json => {
            let entries = |table: &'static [(&'static str, &'static str)]| {
                table
                    .iter()
                    .map(|&(token, description)| TableEntry { token, description })
                    .collect::<Vec<_>>()
            };
            print_json(&CommandsOutput {
                commands: entries(COMMANDS),
                modifiers: entries(MODIFIERS),
            });
        }
        OutputFormat::Table => {
            let mut table = Table::new();
            table
                .load_preset(UTF8_FULL)
                .set_content_arrangement(ContentArrangement::Dynamic)
                .set_header(vec!["TOKEN", "TYPE", "DESCRIPTION"]);
            for (token, description) in COMMANDS {
                table.add_row(vec![*token, "command", *description]);
            }
            for (token, description) in MODIFIERS {
                table.add_row(vec![*token, "modifier", *description]);
            }
            println!("{table}");
        }
        OutputFormat::Pretty => {
            println!("Commands:");
            for (token, description) in COMMANDS {
                println!("  {token:<5} {description}");
            }
            println!("Modifiers:");
            for (token, description) in MODIFIERS {
                println!("  {token:<5} {description}");
            }
        }
        OutputFormat::Raw => {
            for (token, _) in COMMANDS {
                println!("{token}");
            }
        }
    }
}

pub fn print_json<T: Serialize>(value: &T) {
    println!(
        "{}",
        serde_json::to_string(value).unwrap_or_else(|_| "{}".to_string())
    );
}

pub fn direction_name(direction: Direction) -> &'static str {
    match direction {
        Direction::Request => "request",
        Direction::Reply => "reply",
    }
}

fn value_text(packet: &Packet) -> String {
    packet
        .value
        .as_ref()
        .map(ToString::to_string)
        .unwrap_or_else(|| "-".to_string())
}

#[cfg(test)]
mod tests {
    use lssbus_packet::decode;

    use super::*;

    #[test]
    fn packet_json_shape() {
        let packet = decode(b"*12QMSLSS-HT1").unwrap();
        let json = serde_json::to_value(PacketOutput::from(&packet)).unwrap();

        assert_eq!(json["frame"], "*12QMSLSS-HT1");
        assert_eq!(json["device_id"], 12);
        assert_eq!(json["direction"], "reply");
        assert_eq!(json["kind"], "query");
        assert_eq!(json["command"], "MS");
        assert_eq!(json["value"], "LSS-HT1");
        assert_eq!(json["known"], true);
    }

    #[test]
    fn integer_value_serializes_as_number() {
        let packet = decode(b"*19QD-1190").unwrap();
        let json = serde_json::to_value(PacketOutput::from(&packet)).unwrap();
        assert_eq!(json["value"], -1190);
    }

    #[test]
    fn missing_value_serializes_as_null() {
        let packet = decode(b"#1L").unwrap();
        let json = serde_json::to_value(PacketOutput::from(&packet)).unwrap();
        assert!(json["value"].is_null());
        assert_eq!(value_text(&packet), "-");
    }
}
