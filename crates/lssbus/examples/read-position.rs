//! Query one servo's identity and position, then blink its LED.
//!
//! Run with:
//!   cargo run --example read-position -- /dev/ttyUSB0 5
//!
//! Arguments default to `/dev/ttyUSB0` and servo id 0.

use std::thread;
use std::time::Duration;

use lssbus::packet::PacketBus;
use lssbus::transport::ChannelConfig;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let mut args = std::env::args().skip(1);
    let port = args.next().unwrap_or_else(|| "/dev/ttyUSB0".to_string());
    let id: u32 = args.next().map(|s| s.parse()).transpose()?.unwrap_or(0);

    let mut bus = PacketBus::open(&port, ChannelConfig::default())?;
    eprintln!("Opened {port}");

    for parameter in ["MS", "F", "D", "V", "T"] {
        let reply = bus.query(id, parameter)?;
        match &reply.value {
            Some(value) => eprintln!("{:<24} {value}", reply.description),
            None => eprintln!("{:<24} -", reply.description),
        }
    }

    for color in [1, 2, 3, 0] {
        bus.write_command(id, &format!("LED{color}"))?;
        thread::sleep(Duration::from_millis(250));
    }

    bus.close();
    Ok(())
}
