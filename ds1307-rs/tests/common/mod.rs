//! A DS1307 register file behind a transport that finishes every transfer on another thread,
//! the way an interrupt handler would.
#![allow(dead_code)]

use std::{
    sync::{Arc, Mutex},
    thread::{self, JoinHandle},
    time::Duration,
};

use ds1307::{
    BusFault, I2cEvent, I2cEventHandler, I2cTransport, RepeatedStart, TransferFlags,
    TransferStatus,
};
use embedded_hal::delay::DelayNs;

const CHIP_ADDR: u8 = 0x68;
const TRANSFER_TIME: Duration = Duration::from_micros(200);

pub struct Chip {
    pub regs: [u8; 64],
    pub pointer: u8,
    /// Oscillator that never starts: the clock-halt bit stays set.
    pub stuck_halt: bool,
    /// Nothing acknowledges the address.
    pub absent: bool,
}

impl Default for Chip {
    fn default() -> Self {
        let mut regs = [0; 64];
        // Power-on state: halted, 01/01/00, day 1.
        regs[0] = 0x80;
        regs[3] = 0x01;
        regs[4] = 0x01;
        regs[5] = 0x01;
        Self {
            regs,
            pointer: 0,
            stuck_halt: false,
            absent: false,
        }
    }
}

impl Chip {
    fn next(&mut self) -> usize {
        let at = self.pointer as usize;
        self.pointer = (self.pointer + 1) & 0x3f;
        at
    }

    fn write(&mut self, bytes: &[u8]) {
        let Some((&start, data)) = bytes.split_first() else {
            return;
        };
        self.pointer = start & 0x3f;
        for &byte in data {
            let at = self.next();
            self.regs[at] = byte;
        }
        if self.stuck_halt {
            self.regs[0] |= 0x80;
        }
    }

    fn read(&mut self, len: usize) -> Vec<u8> {
        (0..len).map(|_| self.regs[self.next()]).collect()
    }
}

pub type SharedChip = Arc<Mutex<Chip>>;

pub struct ThreadedBus {
    chip: SharedChip,
    handler: Option<&'static dyn I2cEventHandler>,
    enabled: bool,
    rx: Arc<Mutex<Vec<u8>>>,
    worker: Option<JoinHandle<()>>,
    /// Number of transfer requests to refuse before accepting one.
    pub refuse: usize,
    pub stops: usize,
}

impl ThreadedBus {
    fn busy(&mut self) -> bool {
        if !self.enabled || self.worker.as_ref().is_some_and(|w| !w.is_finished()) {
            return true;
        }
        if self.refuse > 0 {
            self.refuse -= 1;
            return true;
        }
        false
    }

    fn spawn(&mut self, job: impl FnOnce(&mut Chip) -> I2cEvent + Send + 'static) {
        let chip = self.chip.clone();
        let handler = self.handler;
        self.worker = Some(thread::spawn(move || {
            thread::sleep(TRANSFER_TIME);
            let event = job(&mut chip.lock().unwrap());
            if let Some(handler) = handler {
                handler.on_event(event);
            }
        }));
    }
}

impl I2cTransport<'static> for ThreadedBus {
    fn peripheral_control(&mut self, enable: bool) {
        self.enabled = enable;
    }

    fn register_handler(&mut self, handler: &'static dyn I2cEventHandler) {
        self.handler = Some(handler);
    }

    fn send(&mut self, addr: u8, bytes: &[u8], _: RepeatedStart) -> TransferStatus {
        if self.busy() {
            return TransferStatus::Busy;
        }
        let bytes = bytes.to_vec();
        self.spawn(move |chip| {
            if chip.absent || addr != CHIP_ADDR {
                return I2cEvent::Error(BusFault::AckFailure);
            }
            chip.write(&bytes);
            I2cEvent::TxComplete
        });
        TransferStatus::Accepted
    }

    fn receive(&mut self, addr: u8, len: usize, _: RepeatedStart) -> TransferStatus {
        if self.busy() {
            return TransferStatus::Busy;
        }
        let rx = self.rx.clone();
        self.spawn(move |chip| {
            if chip.absent || addr != CHIP_ADDR {
                return I2cEvent::Error(BusFault::AckFailure);
            }
            *rx.lock().unwrap() = chip.read(len);
            I2cEvent::RxComplete
        });
        TransferStatus::Accepted
    }

    fn take_received(&mut self, buf: &mut [u8]) -> usize {
        let rx = self.rx.lock().unwrap();
        let n = buf.len().min(rx.len());
        buf[..n].copy_from_slice(&rx[..n]);
        n
    }

    fn generate_stop(&mut self) {
        self.stops += 1;
    }
}

pub struct StdDelay;

impl DelayNs for StdDelay {
    fn delay_ns(&mut self, ns: u32) {
        thread::sleep(Duration::from_nanos(ns.into()));
    }
}

/// A transport around `chip` and completion flags that live for the rest of the test run.
pub fn threaded_bus(chip: Chip) -> (ThreadedBus, SharedChip, &'static TransferFlags) {
    let chip = Arc::new(Mutex::new(chip));
    let bus = ThreadedBus {
        chip: chip.clone(),
        handler: None,
        enabled: false,
        rx: Arc::default(),
        worker: None,
        refuse: 0,
        stops: 0,
    };
    (bus, chip, Box::leak(Box::new(TransferFlags::new())))
}
