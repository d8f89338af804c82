use crate::{BusStatus, OneWireGpio};
use embedded_hal::digital::{InputPin, OutputPin};
use embedded_hal_async::delay::DelayNs;
use embedded_onewire::{OneWireAsync, OneWireError, OneWireResult};
use log::{debug, warn};

impl<P: InputPin + OutputPin, D: DelayNs> OneWireAsync for OneWireGpio<P, D> {
    type Status = BusStatus;

    type BusError = P::Error;

    async fn reset(&mut self) -> OneWireResult<Self::Status, Self::BusError> {
        let t = self.timing;
        self.pin.set_low()?;
        self.delay.delay_us(t.reset_hold).await;
        self.pin.set_high()?;

        let mut waited = 0;
        let mut present = false;
        while waited < t.presence_window {
            let step = t.presence_poll.min(t.presence_window - waited);
            self.delay.delay_us(step).await;
            waited += step;
            if self.pin.is_low()? {
                present = true;
                break;
            }
        }
        if !present {
            warn!("1-Wire reset: no presence pulse within {} us", t.presence_window);
            return Err(OneWireError::PresenceTimeout);
        }
        debug!("1-Wire reset: presence after {waited} us");

        self.delay.delay_us(t.receive_phase_us() - waited).await;
        let level = self.pin.is_high()?;
        if !level {
            warn!("1-Wire reset: line held low after receive phase");
            return Err(OneWireError::ShortCircuit);
        }
        Ok(BusStatus::new()
            .with_presence_detect(true)
            .with_line_level(level))
    }

    async fn write_bit(&mut self, bit: bool) -> OneWireResult<(), Self::BusError> {
        let t = self.timing;
        self.pin.set_low()?;
        if bit {
            self.delay.delay_us(t.write_one_low).await;
            self.pin.set_high()?;
            self.delay.delay_us(t.write_one_rest()).await;
        } else {
            self.delay.delay_us(t.slot).await;
            self.pin.set_high()?;
        }
        self.delay.delay_us(t.recovery).await;
        Ok(())
    }

    async fn read_bit(&mut self) -> OneWireResult<bool, Self::BusError> {
        let t = self.timing;
        self.pin.set_low()?;
        self.delay.delay_us(t.read_init).await;
        self.pin.set_high()?;
        self.delay.delay_us(t.read_sample).await;
        let bit = self.pin.is_high()?;
        self.delay.delay_us(t.read_rest() + t.recovery).await;
        Ok(bit)
    }
}
