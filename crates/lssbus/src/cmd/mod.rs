use std::time::Duration;

use clap::{Args, Subcommand, ValueEnum};
use lssbus_packet::PacketBus;
use lssbus_transport::{ChannelConfig, LowLatency, DEFAULT_BAUD_RATE};
use tracing::debug;

use crate::exit::{packet_error, CliError, CliResult, USAGE};
use crate::output::OutputFormat;

pub mod commands;
pub mod decode;
pub mod query;
pub mod send;
pub mod stress;
pub mod version;

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Decode frames given on the command line.
    Decode(DecodeArgs),
    /// Send one command to a servo.
    Send(SendArgs),
    /// Query one parameter and print the reply.
    Query(QueryArgs),
    /// Run repeated query round trips against one servo.
    Stress(StressArgs),
    /// List known command and modifier tokens.
    Commands(CommandsArgs),
    /// Show version information.
    Version(VersionArgs),
}

pub fn run(command: Command, format: OutputFormat) -> CliResult<i32> {
    match command {
        Command::Decode(args) => decode::run(args, format),
        Command::Send(args) => send::run(args, format),
        Command::Query(args) => query::run(args, format),
        Command::Stress(args) => stress::run(args, format),
        Command::Commands(args) => commands::run(args, format),
        Command::Version(args) => version::run(args),
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum LowLatencyArg {
    Off,
    BestEffort,
    Required,
}

impl From<LowLatencyArg> for LowLatency {
    fn from(arg: LowLatencyArg) -> Self {
        match arg {
            LowLatencyArg::Off => LowLatency::Disabled,
            LowLatencyArg::BestEffort => LowLatency::BestEffort,
            LowLatencyArg::Required => LowLatency::Required,
        }
    }
}

#[derive(Args, Debug)]
pub struct PortArgs {
    /// Serial device path.
    #[arg(long, env = "LSS_PORT", default_value = "/dev/ttyUSB0")]
    pub port: String,
    /// Line speed in baud.
    #[arg(long, env = "LSS_BAUD", default_value_t = DEFAULT_BAUD_RATE)]
    pub baud: u32,
    /// Per-read timeout (e.g. 1s, 500ms).
    #[arg(long, default_value = "1s")]
    pub timeout: String,
    /// Driver low-latency mode.
    #[arg(
        long,
        value_enum,
        env = "LSS_LOW_LATENCY",
        default_value_t = LowLatencyArg::BestEffort
    )]
    pub low_latency: LowLatencyArg,
}

impl PortArgs {
    pub fn channel_config(&self) -> CliResult<ChannelConfig> {
        Ok(ChannelConfig {
            baud_rate: self.baud,
            read_timeout: parse_duration(&self.timeout)?,
            low_latency: self.low_latency.into(),
            ..ChannelConfig::default()
        })
    }

    pub fn open_bus(&self) -> CliResult<PacketBus> {
        let config = self.channel_config()?;
        debug!(port = %self.port, baud = config.baud_rate, "opening bus");
        PacketBus::open(self.port.as_str(), config)
            .map_err(|err| packet_error(&format!("open {} failed", self.port), err))
    }
}

#[derive(Args, Debug)]
pub struct DecodeArgs {
    /// Frames to decode, e.g. `*12QD980`.
    #[arg(required = true)]
    pub frames: Vec<String>,
}

#[derive(Args, Debug)]
pub struct SendArgs {
    #[command(flatten)]
    pub port: PortArgs,
    /// Servo id (254 broadcasts).
    pub id: u32,
    /// Command with kind letter and value, e.g. `D900`, `CLED2`.
    pub command: String,
    /// Wait for one reply and print it.
    #[arg(long)]
    pub wait: bool,
}

#[derive(Args, Debug)]
pub struct QueryArgs {
    #[command(flatten)]
    pub port: PortArgs,
    /// Servo id.
    pub id: u32,
    /// Parameter to query, e.g. `D`, `MS`, `V`.
    pub parameter: String,
}

#[derive(Args, Debug)]
pub struct StressArgs {
    #[command(flatten)]
    pub port: PortArgs,
    /// Servo id.
    pub id: u32,
    /// Number of iterations; each runs QD, QC and QS.
    #[arg(long, default_value_t = 1000)]
    pub count: usize,
}

#[derive(Args, Debug, Default)]
pub struct CommandsArgs {}

#[derive(Args, Debug)]
pub struct VersionArgs {
    /// Show extended build provenance.
    #[arg(long)]
    pub extended: bool,
}

pub fn parse_duration(input: &str) -> CliResult<Duration> {
    let input = input.trim();
    if input.is_empty() {
        return Err(CliError::new(USAGE, "duration must not be empty"));
    }

    let (number, millis) = if let Some(num) = input.strip_suffix("ms") {
        (num, true)
    } else if let Some(num) = input.strip_suffix('s') {
        (num, false)
    } else {
        (input, false)
    };

    let value: u64 = number
        .parse()
        .map_err(|_| CliError::new(USAGE, format!("invalid duration value: {input}")))?;

    if value == 0 {
        return Err(CliError::new(USAGE, "duration must be greater than zero"));
    }

    Ok(if millis {
        Duration::from_millis(value)
    } else {
        Duration::from_secs(value)
    })
}
