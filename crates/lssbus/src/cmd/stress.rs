use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;

use comfy_table::{presets::UTF8_FULL, ContentArrangement, Table};
use lssbus_packet::{Packet, PacketBus, PacketError};
use lssbus_transport::TransportError;
use serde::Serialize;
use tracing::{info, warn};

use crate::cmd::StressArgs;
use crate::exit::{packet_error, CliError, CliResult, FAILURE, INTERNAL, SUCCESS};
use crate::output::{print_json, OutputFormat};

/// Parameters queried on every iteration.
const PARAMETERS: [&str; 3] = ["D", "C", "S"];

const PROGRESS_EVERY: usize = 100;

pub fn run(args: StressArgs, format: OutputFormat) -> CliResult<i32> {
    let mut bus = args.port.open_bus()?;

    let running = Arc::new(AtomicBool::new(true));
    install_ctrlc_handler(running.clone())?;

    let summary = stress(&mut bus, args.id, args.count, &running)?;
    bus.close();

    print_summary(&summary, format);
    Ok(if summary.errors() == 0 {
        SUCCESS
    } else {
        FAILURE
    })
}

trait Querier {
    fn query(&mut self, device_id: u32, parameter: &str) -> Result<Packet, PacketError>;
}

impl Querier for PacketBus {
    fn query(&mut self, device_id: u32, parameter: &str) -> Result<Packet, PacketError> {
        PacketBus::query(self, device_id, parameter)
    }
}

#[derive(Debug, Default, Serialize)]
struct Summary {
    device_id: u32,
    iterations: usize,
    round_trips: usize,
    timeouts: usize,
    garbled: usize,
    mismatched: usize,
    elapsed_ms: u128,
    interrupted: bool,
}

impl Summary {
    fn errors(&self) -> usize {
        self.timeouts + self.garbled + self.mismatched
    }
}

fn stress<Q: Querier>(
    querier: &mut Q,
    device_id: u32,
    count: usize,
    running: &AtomicBool,
) -> CliResult<Summary> {
    let started = Instant::now();
    let mut summary = Summary {
        device_id,
        ..Summary::default()
    };

    for iteration in 0..count {
        if !running.load(Ordering::SeqCst) {
            summary.interrupted = true;
            break;
        }

        for parameter in PARAMETERS {
            summary.round_trips += 1;
            match querier.query(device_id, parameter) {
                Ok(reply) if reply.command == parameter => {}
                Ok(reply) => {
                    summary.mismatched += 1;
                    warn!(
                        iteration,
                        expected = parameter,
                        got = %reply.command,
                        "reply does not match query"
                    );
                }
                Err(PacketError::Transport(TransportError::Timeout(_))) => {
                    summary.timeouts += 1;
                    warn!(iteration, parameter, "no reply");
                }
                Err(
                    err @ (PacketError::InvalidFrame(_)
                    | PacketError::GarbledPayload(_)
                    | PacketError::Transport(TransportError::FrameTooLong { .. })),
                ) => {
                    summary.garbled += 1;
                    warn!(iteration, parameter, error = %err, "bad reply");
                }
                Err(err) => return Err(packet_error("stress aborted", err)),
            }
        }

        summary.iterations = iteration + 1;
        if summary.iterations % PROGRESS_EVERY == 0 {
            info!(
                iterations = summary.iterations,
                of = count,
                errors = summary.errors(),
                "progress"
            );
        }
    }

    summary.elapsed_ms = started.elapsed().as_millis();
    Ok(summary)
}

fn print_summary(summary: &Summary, format: OutputFormat) {
    match format {
        OutputFormat::Json => print_json(summary),
        OutputFormat::Table => {
            let mut table = Table::new();
            table
                .load_preset(UTF8_FULL)
                .set_content_arrangement(ContentArrangement::Dynamic)
                .set_header(vec!["FIELD", "VALUE"]);
            for (field, value) in summary_rows(summary) {
                table.add_row(vec![field.to_string(), value]);
            }
            println!("{table}");
        }
        OutputFormat::Pretty | OutputFormat::Raw => {
            for (field, value) in summary_rows(summary) {
                println!("{field}: {value}");
            }
        }
    }
}

fn summary_rows(summary: &Summary) -> Vec<(&'static str, String)> {
    vec![
        ("device_id", summary.device_id.to_string()),
        ("iterations", summary.iterations.to_string()),
        ("round_trips", summary.round_trips.to_string()),
        ("timeouts", summary.timeouts.to_string()),
        ("garbled", summary.garbled.to_string()),
        ("mismatched", summary.mismatched.to_string()),
        ("elapsed_ms", summary.elapsed_ms.to_string()),
        ("interrupted", summary.interrupted.to_string()),
    ]
}

fn install_ctrlc_handler(running: Arc<AtomicBool>) -> CliResult<()> {
    ctrlc::set_handler(move || {
        running.store(false, Ordering::SeqCst);
    })
    .map_err(|err| CliError::new(INTERNAL, format!("signal handler setup failed: {err}")))
}
