//! Static command and modifier tables.
//!
//! Decoding flags a packet as known when its command token appears in
//! [`COMMANDS`]. Tokens missing from the table still decode.

/// Description reported for tokens missing from [`COMMANDS`].
pub const UNKNOWN_DESCRIPTION: &str = "Unknown command";

/// Command token to description.
pub const COMMANDS: &[(&str, &str)] = &[
    ("ID", "Device ID"),
    ("B", "Baudrate"),
    ("D", "Position in Degrees"),
    ("DT", "Position in Degrees"),
    ("MD", "Move in Degrees"),
    ("WD", "Wheel mode in Degrees"),
    ("VT", "Wheel mode in Degrees"),
    ("WR", "Wheel mode in RPM"),
    ("P", "Position in PWM"),
    ("M", "Move in PWM (relative)"),
    ("RDM", "Raw Duty-Cycle Move"),
    ("Q", "Query Status"),
    ("L", "Limp"),
    ("H", "Halt & Hold"),
    ("EM", "Enable Motion Profile"),
    ("FPC", "Filter Position Count"),
    ("O", "Origin Offset"),
    ("AR", "Angular Range"),
    ("AS", "Angular Stiffness"),
    ("AH", "Angular Holding Stiffness"),
    ("AA", "Angular Acceleration"),
    // Spelling matches the published table; clients compare on it.
    ("AD", "Andular Deceleration"),
    ("G", "Gyre Direction"),
    ("FD", "First Position"),
    ("MMD", "Maximum Motor Duty"),
    ("S", "Query Speed"),
    ("SD", "Maximum Speed in Degrees"),
    ("SD2", "Instant Speed in Degrees"),
    ("SR", "Maximum Speed in RPM"),
    ("SR2", "Instant Speed in RPM"),
    ("V", "Voltage"),
    ("T", "Temperature"),
    ("C", "Current (Amps)"),
    ("LED", "LED Color"),
    ("LB", "LED Blinking"),
    ("MS", "Model String"),
    ("F", "Firmware"),
    ("N", "Serial Number"),
    ("HD", "Holding Delta"),
    ("LN", "Negative Direction Limit"),
    ("LP", "Positive Direction Limit"),
    ("LE", "First Position Limits Enabled"),
    ("CSL", "Current Soft Limit Counter"),
    ("IPE", "IPMS Enabled"),
    ("PO", "Position Origin"),
    ("IS", "Initial Sequence"),
    ("RIS", "Initial Sequence RC"),
    ("CR", "Command Reply"),
    ("TQ", "Current Torque"),
    ("TQT", "Torque Target"),
    ("TQM", "Torque Maximum"),
    ("Y", "Control Mode"),
];

/// Action modifiers that may follow a move command (`#1D900T1500`).
pub const MODIFIERS: &[(&str, &str)] = &[
    ("S", "Speed"),
    ("SD", "Speed in Degrees"),
    ("T", "Timed Move"),
    ("CH", "Current Hold"),
    ("CL", "Current Limp"),
];

/// Look up a command token. Tokens are matched exactly (uppercase).
pub fn describe(token: &str) -> Option<&'static str> {
    lookup(COMMANDS, token)
}

/// Look up an action modifier token.
pub fn describe_modifier(token: &str) -> Option<&'static str> {
    lookup(MODIFIERS, token)
}

fn lookup(table: &'static [(&'static str, &'static str)], token: &str) -> Option<&'static str> {
    table
        .iter()
        .find(|(name, _)| *name == token)
        .map(|(_, description)| *description)
}
