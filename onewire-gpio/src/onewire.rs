use crate::{BusStatus, OneWireGpio};
use embedded_hal::{
    delay::DelayNs,
    digital::{InputPin, OutputPin},
};
use embedded_onewire::{OneWire, OneWireError, OneWireResult};
use log::{debug, warn};

impl<P: InputPin + OutputPin, D: DelayNs> OneWireGpio<P, D> {
    /// Samples the released line every poll step until a device pulls it low or the
    /// presence window runs out. Returns how long it waited, or `None` if nobody answered.
    fn wait_presence(&mut self) -> Result<Option<u32>, P::Error> {
        let t = self.timing;
        let mut waited = 0;
        while waited < t.presence_window {
            let step = t.presence_poll.min(t.presence_window - waited);
            self.delay.delay_us(step);
            waited += step;
            if self.pin.is_low()? {
                return Ok(Some(waited));
            }
        }
        Ok(None)
    }
}

impl<P: InputPin + OutputPin, D: DelayNs> OneWire for OneWireGpio<P, D> {
    type Status = BusStatus;

    type BusError = P::Error;

    fn reset(&mut self) -> OneWireResult<Self::Status, Self::BusError> {
        let t = self.timing;
        self.pin.set_low()?;
        self.delay.delay_us(t.reset_hold);
        self.pin.set_high()?;

        let Some(waited) = self.wait_presence()? else {
            warn!("1-Wire reset: no presence pulse within {} us", t.presence_window);
            return Err(OneWireError::PresenceTimeout);
        };
        debug!("1-Wire reset: presence after {waited} us");

        // The receive phase must run to completion before the next slot.
        self.delay.delay_us(t.receive_phase_us() - waited);
        let level = self.pin.is_high()?;
        if !level {
            warn!("1-Wire reset: line held low after receive phase");
            return Err(OneWireError::ShortCircuit);
        }
        Ok(BusStatus::new()
            .with_presence_detect(true)
            .with_line_level(level))
    }

    fn write_bit(&mut self, bit: bool) -> OneWireResult<(), Self::BusError> {
        let t = self.timing;
        self.pin.set_low()?;
        if bit {
            self.delay.delay_us(t.write_one_low);
            self.pin.set_high()?;
            self.delay.delay_us(t.write_one_rest());
        } else {
            self.delay.delay_us(t.slot);
            self.pin.set_high()?;
        }
        self.delay.delay_us(t.recovery);
        Ok(())
    }

    fn read_bit(&mut self) -> OneWireResult<bool, Self::BusError> {
        let t = self.timing;
        self.pin.set_low()?;
        self.delay.delay_us(t.read_init);
        self.pin.set_high()?;
        self.delay.delay_us(t.read_sample);
        let bit = self.pin.is_high()?;
        self.delay.delay_us(t.read_rest());
        self.delay.delay_us(t.recovery);
        Ok(bit)
    }
}
