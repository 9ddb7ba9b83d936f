use crate::cmd::QueryArgs;
use crate::exit::{packet_error, CliResult, SUCCESS};
use crate::output::{print_packet, OutputFormat};

pub fn run(args: QueryArgs, format: OutputFormat) -> CliResult<i32> {
    let mut bus = args.port.open_bus()?;
    let reply = bus
        .query(args.id, &args.parameter)
        .map_err(|err| packet_error("query failed", err))?;
    print_packet(&reply, format);
    bus.close();
    Ok(SUCCESS)
}
