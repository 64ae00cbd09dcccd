//! # Touch Input
//!
//! Up to two contact points, polled once per frame.
//!
//! - `ft6236`: register-level driver for the capacitive touch controller
//! - [`ScriptedInput`]: replays a fixed list of samples (host, tests)
//! - [`NoInput`]: a panel without touch

pub mod ft6236;

use alloc::vec::Vec;

pub use ft6236::Ft6236;

use crate::error::TouchError;

/// Contacts the controller can track at once
pub const MAX_CONTACTS: usize = 2;

/// One finger on the panel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Contact {
    pub id: u8,
    pub active: bool,
    pub x: i16,
    pub y: i16,
    /// Movement since the previous sample; zero while inactive
    pub dx: i16,
    pub dy: i16,
}

impl Contact {
    pub const fn idle(id: u8) -> Self {
        Self {
            id,
            active: false,
            x: 0,
            y: 0,
            dx: 0,
            dy: 0,
        }
    }

    pub fn has_moved(&self) -> bool {
        self.dx != 0 || self.dy != 0
    }

    /// Record a new position, keeping the delta to the last known one
    pub(crate) fn press(&mut self, x: i16, y: i16) {
        self.dx = x - self.x;
        self.dy = y - self.y;
        self.x = x;
        self.y = y;
        self.active = true;
    }

    pub(crate) fn release(&mut self) {
        self.active = false;
        self.dx = 0;
        self.dy = 0;
    }
}

/// Pointing device polled by the frame loop
pub trait PointerInput {
    /// Sample the device. Returns how many contacts are active (0..=2).
    /// Never blocks beyond one bus transaction.
    fn poll(&mut self) -> Result<u8, TouchError>;

    /// Latest state of contact `id`; ids past the last contact read idle
    fn contact(&self, id: usize) -> Contact;

    fn contacts(&self) -> [Contact; MAX_CONTACTS] {
        [self.contact(0), self.contact(1)]
    }

    /// False for stand-ins with no device behind them; the frame loop
    /// then leaves the input stage out of its timings
    fn is_present(&self) -> bool {
        true
    }
}

/// Panel without a touch controller
#[derive(Debug, Default, Clone, Copy)]
pub struct NoInput;

impl PointerInput for NoInput {
    fn poll(&mut self) -> Result<u8, TouchError> {
        Ok(0)
    }

    fn contact(&self, id: usize) -> Contact {
        Contact::idle(id as u8)
    }

    fn is_present(&self) -> bool {
        false
    }
}

/// One poll's worth of finger positions
pub type Sample = [Option<(i16, i16)>; MAX_CONTACTS];

/// Replays samples in order, then reports no contacts
#[derive(Debug, Default)]
pub struct ScriptedInput {
    samples: Vec<Sample>,
    next: usize,
    contacts: [Contact; MAX_CONTACTS],
}

impl ScriptedInput {
    pub fn new(samples: Vec<Sample>) -> Self {
        Self {
            samples,
            next: 0,
            contacts: [Contact::idle(0), Contact::idle(1)],
        }
    }

    /// Single finger dragged through `points`, one point per poll
    pub fn drag(points: &[(i16, i16)]) -> Self {
        Self::new(points.iter().map(|&p| [Some(p), None]).collect())
    }

    pub fn remaining(&self) -> usize {
        self.samples.len().saturating_sub(self.next)
    }
}

impl PointerInput for ScriptedInput {
    fn poll(&mut self) -> Result<u8, TouchError> {
        let sample = self.samples.get(self.next).copied().unwrap_or([None; MAX_CONTACTS]);
        self.next = (self.next + 1).min(self.samples.len());

        let mut active = 0;
        for (contact, point) in self.contacts.iter_mut().zip(sample) {
            match point {
                Some((x, y)) => {
                    contact.press(x, y);
                    active += 1;
                }
                None => contact.release(),
            }
        }
        Ok(active)
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
    use alloc::vec;

    #[test]
    fn deltas_follow_the_finger() {
        let mut input = ScriptedInput::drag(&[(10, 10), (12, 15), (12, 15)]);
        assert_eq!(input.poll(), Ok(1));
        assert_eq!(input.poll(), Ok(1));
        let c = input.contact(0);
        assert_eq!((c.x, c.y, c.dx, c.dy), (12, 15, 2, 5));
        assert!(c.has_moved());

        input.poll().unwrap();
        assert!(!input.contact(0).has_moved());
        assert_eq!(input.remaining(), 0);
    }

    #[test]
    fn released_contacts_report_no_motion() {
        let mut input = ScriptedInput::new(vec![[Some((5, 5)), Some((50, 60))], [None, None]]);
        assert_eq!(input.poll(), Ok(2));
        assert!(input.contact(1).active);
        assert_eq!(input.poll(), Ok(0));
        let c = input.contact(1);
        assert!(!c.active);
        assert!(!c.has_moved());
        assert_eq!(input.contact(7), Contact::idle(7));
    }
}
