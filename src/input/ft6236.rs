//! FT6236 capacitive touch controller
//!
//! The whole touch report is one 16-byte read starting at register 0:
//!
//! | Offset     | Contents                                      |
//! |------------|-----------------------------------------------|
//! | 0x02       | number of touch points                        |
//! | 0x03 + 6i  | event flag (7:6), x high nibble (3:0)         |
//! | 0x04 + 6i  | x low byte                                    |
//! | 0x05 + 6i  | touch id (7:4), y high nibble (3:0)           |
//! | 0x06 + 6i  | y low byte                                    |
use embedded_hal::i2c::I2c;

use super::{Contact, PointerInput, MAX_CONTACTS};
use crate::error::TouchError;

/// 7-bit bus address on the Presto
pub const FT6236_ADDR: u8 = 0x48;

const REPORT_LEN: usize = 16;

/// Event flag of a report slot the controller left unused
const EVENT_NONE: u8 = 0b11;

#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reg {
    DevMode = 0x00,
    GestureId = 0x01,
    Threshold = 0x80,
    Filter = 0x85,
    ChipId = 0xA3,
}

/// One decoded point from a report
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RawPoint {
    pub id: u8,
    pub x: i16,
    pub y: i16,
}

/// Decode a touch report. Only the first `touch count` slots are read;
/// slots flagged "no event" and ids outside 0..2 are dropped.
pub fn parse_report(report: &[u8; REPORT_LEN]) -> [Option<RawPoint>; MAX_CONTACTS] {
    let mut points = [None; MAX_CONTACTS];
    let count = usize::from(report[2] & 0x0F).min(MAX_CONTACTS);
    for (i, slot) in points.iter_mut().enumerate().take(count) {
        let base = 3 + i * 6;
        if report[base] >> 6 == EVENT_NONE {
            continue;
        }
        let id = report[base + 2] >> 4;
        if usize::from(id) >= MAX_CONTACTS {
            continue;
        }
        let x = (i16::from(report[base] & 0x0F) << 8) | i16::from(report[base + 1]);
        let y = (i16::from(report[base + 2] & 0x0F) << 8) | i16::from(report[base + 3]);
        *slot = Some(RawPoint { id, x, y });
    }
    points
}

pub struct Ft6236<I2C> {
    i2c: I2C,
    address: u8,
    contacts: [Contact; MAX_CONTACTS],
}

impl<I2C: I2c> Ft6236<I2C> {
    pub fn new(i2c: I2C) -> Self {
        Self::with_address(i2c, FT6236_ADDR)
    }

    pub fn with_address(i2c: I2C, address: u8) -> Self {
        Self {
            i2c,
            address,
            contacts: [Contact::idle(0), Contact::idle(1)],
        }
    }

    pub fn release(self) -> I2C {
        self.i2c
    }

    pub fn read_reg(&mut self, reg: Reg) -> Result<u8, TouchError> {
        let mut value = [0u8];
        self.i2c
            .write_read(self.address, &[reg as u8], &mut value)
            .map_err(|_| TouchError::Bus)?;
        Ok(value[0])
    }

    pub fn write_reg(&mut self, reg: Reg, value: u8) -> Result<(), TouchError> {
        self.i2c
            .write(self.address, &[reg as u8, value])
            .map_err(|_| TouchError::Bus)
    }

    pub fn chip_id(&mut self) -> Result<u8, TouchError> {
        self.read_reg(Reg::ChipId)
    }

    /// Read one report and update both contacts. Returns the number of
    /// contacts active in this report. A failed read releases every
    /// contact so the last sample is not seen twice.
    pub fn read_touch(&mut self) -> Result<u8, TouchError> {
        let mut report = [0u8; REPORT_LEN];
        if self
            .i2c
            .write_read(self.address, &[Reg::DevMode as u8], &mut report)
            .is_err()
        {
            self.contacts.iter_mut().for_each(Contact::release);
            return Err(TouchError::Bus);
        }

        let points = parse_report(&report);
        let mut seen = [false; MAX_CONTACTS];
        for point in points.into_iter().flatten() {
            let id = usize::from(point.id);
            self.contacts[id].press(point.x, point.y);
            seen[id] = true;
        }
        for (contact, seen) in self.contacts.iter_mut().zip(seen) {
            if !seen {
                contact.release();
            }
        }
        let active = seen.iter().filter(|&&s| s).count() as u8;
        log::trace!("touch: {} active", active);
        Ok(active)
    }
}

impl<I2C: I2c> PointerInput for Ft6236<I2C> {
    fn poll(&mut self) -> Result<u8, TouchError> {
        self.read_touch()
    }

    fn contact(&self, id: usize) -> Contact {
        self.contacts
            .get(id)
            .copied()
            .unwrap_or(Contact::idle(id as u8))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::collections::VecDeque;
    use alloc::vec::Vec;
        use embedded_hal::i2c::{ErrorKind, ErrorType, Operation};

    /// Answers every read with the next queued report; `None` in the queue
    /// fails that transaction
    #[derive(Default)]
    struct Bus {
        reports: VecDeque<Option<[u8; REPORT_LEN]>>,
        written: Vec<(u8, Vec<u8>)>,
    }

    impl Bus {
        fn queue(&mut self, report: [u8; REPORT_LEN]) {
            self.reports.push_back(Some(report));
        }
    }

    impl ErrorType for Bus {
        type Error = ErrorKind;
    }

    impl I2c for Bus {
        fn transaction(&mut self, address: u8, operations: &mut [Operation<'_>]) -> Result<(), ErrorKind> {
            if self.reports.front() == Some(&None) {
                self.reports.pop_front();
                return Err(ErrorKind::Other);
            }
            for op in operations.iter_mut() {
                match op {
                    Operation::Write(bytes) => self.written.push((address, bytes.to_vec())),
                    Operation::Read(buf) => {
                        let report = self.reports.pop_front().flatten().unwrap_or([0; REPORT_LEN]);
                        let n = buf.len();
                        buf.copy_from_slice(&report[..n]);
                    }
                }
            }
            Ok(())
        }
    }

    /// A report as the controller sends it: unused slots read back as 0xFF
    fn report(points: &[(u8, u16, u16)]) -> [u8; REPORT_LEN] {
        let mut r = [0xFFu8; REPORT_LEN];
        r[0] = 0;
        r[1] = 0;
        r[2] = points.len() as u8;
        for (i, &(id, x, y)) in points.iter().enumerate() {
            let base = 3 + i * 6;
            r[base] = (x >> 8) as u8 & 0x0F;
            r[base + 1] = x as u8;
            r[base + 2] = (id << 4) | ((y >> 8) as u8 & 0x0F);
            r[base + 3] = y as u8;
        }
        r
    }

    #[test]
    fn parses_twelve_bit_coordinates() {
        let points = parse_report(&report(&[(0, 0x1E0, 0x123), (1, 7, 300)]));
        assert_eq!(points[0], Some(RawPoint { id: 0, x: 0x1E0, y: 0x123 }));
        assert_eq!(points[1], Some(RawPoint { id: 1, x: 7, y: 300 }));
        assert_eq!(parse_report(&[0; REPORT_LEN]), [None, None]);
    }

    #[test]
    fn out_of_range_ids_are_ignored() {
        let points = parse_report(&report(&[(2, 10, 10), (15, 1, 1)]));
        assert_eq!(points, [None, None]);
    }

    #[test]
    fn slots_past_the_touch_count_are_ignored() {
        // one touch, second slot zeroed rather than 0xFF
        let mut r = [0u8; REPORT_LEN];
        r[2] = 1;
        r[4] = 50;
        r[6] = 60;
        assert_eq!(parse_report(&r), [Some(RawPoint { id: 0, x: 50, y: 60 }), None]);

        // count claims two but the second slot carries no event
        let mut r = report(&[(0, 10, 20), (1, 30, 40)]);
        r[9] |= EVENT_NONE << 6;
        assert_eq!(parse_report(&r), [Some(RawPoint { id: 0, x: 10, y: 20 }), None]);
    }

    #[test]
    fn one_finger_keeps_its_delta_across_polls() {
        let mut bus = Bus::default();
        let mut zeroed = [0u8; REPORT_LEN];
        zeroed[2] = 1;
        zeroed[4] = 110;
        zeroed[6] = 20;
        bus.queue(report(&[(0, 100, 20)]));
        bus.queue(zeroed);
        let mut touch = Ft6236::new(bus);

        assert_eq!(touch.poll(), Ok(1));
        assert_eq!(touch.poll(), Ok(1));
        let c = touch.contact(0);
        assert_eq!((c.x, c.y, c.dx, c.dy), (110, 20, 10, 0));
        assert!(!touch.contact(1).active);
    }

    #[test]
    fn bus_error_releases_every_contact() {
        let mut bus = Bus::default();
        bus.queue(report(&[(0, 100, 50), (1, 300, 300)]));
        bus.queue(report(&[(0, 110, 50), (1, 300, 310)]));
        bus.reports.push_back(None);
        let mut touch = Ft6236::new(bus);

        assert_eq!(touch.poll(), Ok(2));
        assert_eq!(touch.poll(), Ok(2));
        assert_eq!(touch.contact(0).dx, 10);

        assert_eq!(touch.poll(), Err(TouchError::Bus));
        for c in touch.contacts() {
            assert!(!c.active);
            assert!(!c.has_moved());
        }
    }

    #[test]
    fn deltas_track_each_contact() {
        let mut bus = Bus::default();
        bus.queue(report(&[(0, 100, 100)]));
        bus.queue(report(&[(0, 104, 97), (1, 200, 400)]));
        bus.queue(report(&[]));
        let mut touch = Ft6236::new(bus);

        assert_eq!(touch.poll(), Ok(1));
        assert_eq!(touch.poll(), Ok(2));
        let c = touch.contact(0);
        assert_eq!((c.x, c.y, c.dx, c.dy), (104, 97, 4, -3));
        assert!(touch.contact(1).active);

        assert_eq!(touch.poll(), Ok(0));
        assert!(!touch.contact(0).active);
        assert!(!touch.contact(0).has_moved());

        let bus = touch.release();
        assert!(bus.written.iter().all(|(addr, bytes)| *addr == 0x48 && bytes == &[0x00]));
    }

    #[test]
    fn register_access() {
        let mut bus = Bus::default();
        let mut id = [0u8; REPORT_LEN];
        id[0] = 0x64;
        bus.queue(id);
        let mut touch = Ft6236::new(bus);
        assert_eq!(touch.chip_id(), Ok(0x64));
        touch.write_reg(Reg::Threshold, 40).unwrap();

        let bus = touch.release();
        assert_eq!(bus.written, [(0x48, alloc::vec![0xA3]), (0x48, alloc::vec![0x80, 40])]);
    }
}
