//! ROM command codes shared by every 1-Wire slave.

/// Command to read the 64-bit ROM of the only device on the bus.
///
/// Every device answers at once, so the result is only meaningful on a single-drop bus.
pub const ONEWIRE_READ_ROM_CMD: u8 = 0x33;

/// Command to match a specific ROM address in 1-Wire communication (non-overdrive mode)
pub const ONEWIRE_MATCH_ROM_CMD: u8 = 0x55;

/// Command to skip ROM address in 1-Wire communication (non-overdrive mode)
pub const ONEWIRE_SKIP_ROM_CMD: u8 = 0xcc;

/// Overdrive-Match ROM: addresses one device by its 64-bit ROM and switches it to overdrive speed.
/// Devices return to standard speed at the next reset pulse of at least 480μs.
pub const ONEWIRE_MATCH_ROM_CMD_OD: u8 = 0x69;

/// Overdrive-Skip ROM: addresses every device on a single-drop bus and switches it to overdrive speed.
/// All communication following this command has to occur at overdrive speed until
/// a reset pulse of at least 480μs.
pub const ONEWIRE_SKIP_ROM_CMD_OD: u8 = 0x3c;

/// Command to search for devices on the 1-Wire bus
pub const ONEWIRE_SEARCH_CMD: u8 = 0xf0;

/// Command to search for devices in alarm state on the 1-Wire bus
pub const ONEWIRE_ALARM_SEARCH_CMD: u8 = 0xec;
