use lssbus_packet::decode;

use crate::cmd::DecodeArgs;
use crate::exit::{packet_error, CliResult, SUCCESS};
use crate::output::{print_packets, OutputFormat};

pub fn run(args: DecodeArgs, format: OutputFormat) -> CliResult<i32> {
    let mut packets = Vec::with_capacity(args.frames.len());
    for frame in &args.frames {
        let packet = decode(frame.as_bytes())
            .map_err(|err| packet_error(&format!("decode {frame:?} failed"), err))?;
        packets.push(packet);
    }
    print_packets(&packets, format);
    Ok(SUCCESS)
}
