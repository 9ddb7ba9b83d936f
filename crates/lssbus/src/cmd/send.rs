use tracing::info;

use crate::cmd::SendArgs;
use crate::exit::{packet_error, CliError, CliResult, SUCCESS, USAGE};
use crate::output::{print_packet, OutputFormat};

pub fn run(args: SendArgs, format: OutputFormat) -> CliResult<i32> {
    let command = validate_command(&args.command)?;
    let mut bus = args.port.open_bus()?;

    bus.write_command(args.id, command)
        .map_err(|err| packet_error("send failed", err))?;
    info!(id = args.id, command, "sent");

    if args.wait {
        let reply = bus
            .read()
            .map_err(|err| packet_error("receive failed", err))?;
        print_packet(&reply, format);
    }

    bus.close();
    Ok(SUCCESS)
}

/// The command goes on the wire as-is, so it must be one printable ASCII
/// token with no terminator of its own.
fn validate_command(command: &str) -> CliResult<&str> {
    let command = command.trim();
    if command.is_empty() {
        return Err(CliError::new(USAGE, "command must not be empty"));
    }
    if !command.bytes().all(|b| b.is_ascii_graphic()) {
        return Err(CliError::new(
            USAGE,
            format!("command must be printable ASCII without spaces: {command:?}"),
        ));
    }
    Ok(command)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_plain_commands() {
        assert_eq!(validate_command("CLED2").unwrap(), "CLED2");
        assert_eq!(validate_command(" D-900 ").unwrap(), "D-900");
    }

    #[test]
    fn rejects_empty_or_control_characters() {
        assert_eq!(validate_command("  ").unwrap_err().code, USAGE);
        assert_eq!(validate_command("D9\r00").unwrap_err().code, USAGE);
        assert_eq!(validate_command("D 900").unwrap_err().code, USAGE);
    }
}
