//! Serial-driver low-latency capability.
//!
//! Some USB serial drivers buffer inbound bytes for several milliseconds
//! before handing them to userspace. Linux exposes a per-port flag that turns
//! this off; other platforms get the [`Unsupported`] fallback.

use std::io;

/// Toggles low-latency mode on one open serial port.
pub trait LatencyControl: Send {
    /// Enable or disable low-latency mode.
    fn set_low_latency(&mut self, enable: bool) -> io::Result<()>;

    /// Capability name for diagnostics.
    fn name(&self) -> &'static str;
}

/// Fallback for ports and platforms without a latency flag.
#[derive(Debug, Default, Clone, Copy)]
pub struct Unsupported;

impl LatencyControl for Unsupported {
    fn set_low_latency(&mut self, _enable: bool) -> io::Result<()> {
        Err(io::Error::new(
            io::ErrorKind::Unsupported,
            "low-latency mode is not available on this platform",
        ))
    }

    fn name(&self) -> &'static str {
        "unsupported"
    }
}

#[cfg(target_os = "linux")]
pub use linux::AsyncLowLatency;

#[cfg(target_os = "linux")]
mod linux {
    use std::io;
    use std::os::fd::RawFd;

    use super::LatencyControl;

    /// `ASYNC_LOW_LATENCY` bit of `serial_struct.flags`.
    const ASYNC_LOW_LATENCY: libc::c_int = 1 << 13;
    /// Index of `flags` when `serial_struct` is viewed as an int array
    /// (`type`, `line`, `port`, `irq`, `flags`, ...).
    const FLAGS_INDEX: usize = 4;
    /// Oversized scratch area; the kernel struct is well under 128 bytes.
    const SERIAL_STRUCT_INTS: usize = 32;

    /// Linux `TIOCGSERIAL`/`TIOCSSERIAL` toggle of `ASYNC_LOW_LATENCY`.
    ///
    /// Borrows the descriptor of a port owned elsewhere; the owner must keep
    /// the port open for as long as this value is used.
    #[derive(Debug)]
    pub struct AsyncLowLatency {
        fd: RawFd,
    }

    impl AsyncLowLatency {
        pub fn new(fd: RawFd) -> Self {
            Self { fd }
        }
    }

    impl LatencyControl for AsyncLowLatency {
        fn set_low_latency(&mut self, enable: bool) -> io::Result<()> {
            let mut serial = [0 as libc::c_int; SERIAL_STRUCT_INTS];

            // SAFETY: `serial` is a writable buffer larger than `struct serial_struct`
            // and `fd` is a descriptor the caller keeps open.
            let rc = unsafe { libc::ioctl(self.fd, libc::TIOCGSERIAL, serial.as_mut_ptr()) };
            if rc < 0 {
                return Err(io::Error::last_os_error());
            }

            if enable {
                serial[FLAGS_INDEX] |= ASYNC_LOW_LATENCY;
            } else {
                serial[FLAGS_INDEX] &= !ASYNC_LOW_LATENCY;
            }

            // SAFETY: same buffer, filled by the kernel above with only the flag changed.
            let rc = unsafe { libc::ioctl(self.fd, libc::TIOCSSERIAL, serial.as_ptr()) };
            if rc < 0 {
                return Err(io::Error::last_os_error());
            }
            Ok(())
        }

        fn name(&self) -> &'static str {
            "async-low-latency"
        }
    }
}
