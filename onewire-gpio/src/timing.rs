/// Standard-speed 1-Wire slot timing, in microseconds.
///
/// Defaults follow the datasheet minimums with margin:
///
/// | Parameter | Default | Meaning |
/// |-----------|---------|---------|
/// | `reset_hold` | 480 | master holds the line low to reset all devices |
/// | `presence_window` | 150 | after release, time during which a presence pulse must appear |
/// | `presence_hold` | 330 | rest of the receive phase once the window ends |
/// | `presence_poll` | 10 | spacing of line samples inside the presence window |
/// | `slot` | 60 | length of one read or write time slot |
/// | `write_one_low` | 6 | low time of a write-1 slot (must stay under 15) |
/// | `read_init` | 1 | low time that starts a read slot |
/// | `read_sample` | 9 | wait after release before sampling a read slot |
/// | `recovery` | 1 | idle time between slots |
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OneWireTiming {
    pub(crate) reset_hold: u32,
    pub(crate) presence_window: u32,
    pub(crate) presence_hold: u32,
    pub(crate) presence_poll: u32,
    pub(crate) slot: u32,
    pub(crate) write_one_low: u32,
    pub(crate) read_init: u32,
    pub(crate) read_sample: u32,
    pub(crate) recovery: u32,
}

impl Default for OneWireTiming {
    fn default() -> Self {
        OneWireTiming {
            reset_hold: 480,
            presence_window: 150,
            presence_hold: 330,
            presence_poll: 10,
            slot: 60,
            write_one_low: 6,
            read_init: 1,
            read_sample: 9,
            recovery: 1,
        }
    }
}

impl OneWireTiming {
    /// Reset low time (tRSTL).
    pub fn reset_hold_us(&self) -> u32 {
        self.reset_hold
    }

    /// Window after the reset pulse in which the presence pulse is looked for.
    pub fn presence_window_us(&self) -> u32 {
        self.presence_window
    }

    /// Hold after the presence window.
    pub fn presence_hold_us(&self) -> u32 {
        self.presence_hold
    }

    /// Sampling step inside the presence window.
    pub fn presence_poll_us(&self) -> u32 {
        self.presence_poll
    }

    /// Whole receive phase after the reset pulse (tRSTH).
    pub fn receive_phase_us(&self) -> u32 {
        self.presence_window + self.presence_hold
    }

    /// Number of line samples taken inside the presence window.
    pub fn presence_samples(&self) -> u32 {
        self.presence_window.div_ceil(self.presence_poll)
    }

    /// Time slot length (tSLOT).
    pub fn slot_us(&self) -> u32 {
        self.slot
    }

    /// Low time of a write-1 slot (tLOW1).
    pub fn write_one_low_us(&self) -> u32 {
        self.write_one_low
    }

    /// Low time starting a read slot.
    pub fn read_init_us(&self) -> u32 {
        self.read_init
    }

    /// Delay from release to sampling in a read slot.
    pub fn read_sample_us(&self) -> u32 {
        self.read_sample
    }

    /// Recovery time between slots (tREC).
    pub fn recovery_us(&self) -> u32 {
        self.recovery
    }

    /// Time left in a write-1 slot after the line is released.
    pub(crate) fn write_one_rest(&self) -> u32 {
        self.slot.saturating_sub(self.write_one_low)
    }

    /// Time left in a read slot after the sample.
    pub(crate) fn read_rest(&self) -> u32 {
        self.slot
            .saturating_sub(self.read_init)
            .saturating_sub(self.read_sample)
    }
}

/// Builder for configuring the 1-Wire slot timing.
///
/// Values outside the protocol limits are clamped when set.
#[derive(Debug, Default)]
pub struct OneWireTimingBuilder {
    cfg: OneWireTiming,
}

impl From<OneWireTiming> for OneWireTimingBuilder {
    fn from(cfg: OneWireTiming) -> Self {
        OneWireTimingBuilder { cfg }
    }
}

impl OneWireTimingBuilder {
    /// Set the reset low time, at least 480 µs.
    pub fn reset_pulse(mut self, us: u32) -> Self {
        self.cfg.reset_hold = us.max(480);
        self
    }

    /// Set the presence window and the hold that completes the receive phase.
    ///
    /// The receive phase (`window + hold`) is kept at 480 µs or more.
    pub fn presence(mut self, window_us: u32, hold_us: u32) -> Self {
        self.cfg.presence_window = window_us.max(1);
        self.cfg.presence_hold = hold_us.max(480u32.saturating_sub(self.cfg.presence_window));
        self
    }

    /// Set the sampling step inside the presence window.
    pub fn presence_poll(mut self, us: u32) -> Self {
        self.cfg.presence_poll = us.max(1);
        self
    }

    /// Set the time slot length, 60 µs to 120 µs.
    pub fn slot(mut self, us: u32) -> Self {
        self.cfg.slot = us.clamp(60, 120);
        self
    }

    /// Set the write-1 low time, 1 µs to 15 µs.
    pub fn write_one_low(mut self, us: u32) -> Self {
        self.cfg.write_one_low = us.clamp(1, 15);
        self
    }

    /// Set the read slot initiation and sampling delays.
    ///
    /// The sample point (`init + sample`) is kept inside the 15 µs data-valid window.
    pub fn read(mut self, init_us: u32, sample_us: u32) -> Self {
        self.cfg.read_init = init_us.clamp(1, 14);
        self.cfg.read_sample = sample_us.min(15 - self.cfg.read_init);
        self
    }

    /// Set the recovery time between slots, at least 1 µs.
    pub fn recovery(mut self, us: u32) -> Self {
        self.cfg.recovery = us.max(1);
        self
    }

    /// Build the configuration.
    pub fn build(self) -> OneWireTiming {
        self.cfg
    }
}
