use bitfield_struct::bitfield;
use embedded_onewire::OneWireStatus;

/// Outcome of a reset/presence-detect cycle.
///
/// Only a cycle that saw a presence pulse and a released line produces a status; the failure
/// cases are reported as [`OneWireError`](embedded_onewire::OneWireError) instead.
#[bitfield(u8)]
#[derive(PartialEq, Eq)]
pub struct BusStatus {
    /// A device pulled the line low inside the presence window.
    pub presence_detect: bool,
    /// The line was still low once the receive phase ended.
    pub short_detect: bool,
    /// Line level sampled at the end of the receive phase.
    pub line_level: bool,
    #[bits(5)]
    __: u8,
}

impl OneWireStatus for BusStatus {
    fn presence(&self) -> bool {
        self.presence_detect()
    }

    fn shortcircuit(&self) -> bool {
        self.short_detect()
    }

    fn logic_level(&self) -> Option<bool> {
        Some(self.line_level())
    }
}
