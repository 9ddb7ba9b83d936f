mod cmd;
mod exit;
mod logging;
mod output;

use clap::Parser;

use crate::cmd::Command;
use crate::logging::{init_logging, LogFormat, LogLevel};
use crate::output::OutputFormat;

/// Talk to Lynxmotion Smart Servos over a serial bus.
///
/// Frames go out as `#<id><command>` and replies come back as
/// `*<id><command><value>`, each ended by a carriage return.
#[derive(Parser, Debug)]
#[command(
    name = "lssbus",
    version,
    after_help = "Examples:\n  lssbus query --port /dev/ttyUSB0 5 D\n  lssbus send 254 LED2\n  lssbus decode '*5QD1800'"
)]
struct Cli {
    /// How packets and summaries are printed. Defaults to a table on a
    /// terminal and JSON lines otherwise.
    #[arg(long, value_name = "FORMAT", global = true)]
    format: Option<OutputFormat>,

    /// Diagnostic log format on stderr.
    #[arg(long, value_name = "FORMAT", default_value = "text", global = true)]
    log_format: LogFormat,

    /// Diagnostic log level on stderr. RUST_LOG wins when set.
    #[arg(long, value_name = "LEVEL", default_value = "info", global = true)]
    log_level: LogLevel,

    #[command(subcommand)]
    command: Command,
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.log_format, cli.log_level);

    let format = cli.format.unwrap_or_else(OutputFormat::default_for_stdout);
    let result = cmd::run(cli.command, format);

    let code = match result {
        Ok(code) => code,
        Err(err) => {
            eprintln!("lssbus: {err}");
            err.code
        }
    };
    std::process::exit(code);
}
