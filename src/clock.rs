//! Microsecond time source and per-stage frame timings
use core::fmt;

/// Monotonic microsecond counter
pub trait FrameClock {
    fn now_us(&self) -> u64;
}

impl<F: Fn() -> u64> FrameClock for F {
    fn now_us(&self) -> u64 {
        self()
    }
}

/// Wall clock measured from construction
#[cfg(feature = "std")]
#[derive(Debug, Clone, Copy)]
pub struct StdClock {
    origin: std::time::Instant,
}

#[cfg(feature = "std")]
impl StdClock {
    pub fn new() -> Self {
        Self {
            origin: std::time::Instant::now(),
        }
    }
}

#[cfg(feature = "std")]
impl Default for StdClock {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(feature = "std")]
impl FrameClock for StdClock {
    fn now_us(&self) -> u64 {
        self.origin.elapsed().as_micros() as u64
    }
}

/// Stopwatch: each lap returns the time since the previous lap
pub struct Elapsed<'c, C: FrameClock + ?Sized> {
    clock: &'c C,
    last: u64,
}

impl<'c, C: FrameClock + ?Sized> Elapsed<'c, C> {
    pub fn start(clock: &'c C) -> Self {
        Self {
            last: clock.now_us(),
            clock,
        }
    }

    pub fn lap_us(&mut self) -> u64 {
        let now = self.clock.now_us();
        let lap = now.saturating_sub(self.last);
        self.last = now;
        lap
    }

    pub fn lap_ms(&mut self) -> f32 {
        self.lap_us() as f32 / 1000.0
    }
}

/// Time spent in each stage of one frame, in microseconds
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StageTimings {
    /// `None` when the frame loop has no input device
    pub input: Option<u64>,
    pub update: u64,
    pub clear: u64,
    pub draw: u64,
    pub vsync: u64,
}

impl StageTimings {
    pub fn total_us(&self) -> u64 {
        self.input.unwrap_or(0) + self.update + self.clear + self.draw + self.vsync
    }

    /// Frames per second in hundredths; 0 when nothing was measured
    pub fn fps_centi(&self) -> u64 {
        match self.total_us() {
            0 => 0,
            total => 100_000_000 / total,
        }
    }

    pub fn fps(&self) -> f32 {
        self.fps_centi() as f32 / 100.0
    }
}

/// Milliseconds with two decimals, from microseconds
struct Ms(u64);

impl fmt::Display for Ms {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{:02}", self.0 / 1000, self.0 % 1000 / 10)
    }
}

impl fmt::Display for StageTimings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(input) = self.input {
            write!(f, "I={} ", Ms(input))?;
        }
        let fps = self.fps_centi();
        write!(
            f,
            "U={} C={} D={} V={} A={} F={}.{:02}",
            Ms(self.update),
            Ms(self.clear),
            Ms(self.draw),
            Ms(self.vsync),
            Ms(self.total_us()),
            fps / 100,
            fps % 100
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::string::ToString;
    use core::cell::Cell;

    #[test]
    fn laps_measure_since_previous_lap() {
        let now = Cell::new(1_000u64);
        let clock = || now.get();
        let mut sw = Elapsed::start(&clock);
        now.set(1_250);
        assert_eq!(sw.lap_us(), 250);
        now.set(3_250);
        assert_eq!(sw.lap_ms(), 2.0);
        assert_eq!(sw.lap_us(), 0);
    }

    #[test]
    fn report_line() {
        let t = StageTimings {
            input: None,
            update: 1_230,
            clear: 500,
            draw: 4_000,
            vsync: 10_937,
        };
        assert_eq!(t.total_us(), 16_667);
        assert_eq!(t.to_string(), "U=1.23 C=0.50 D=4.00 V=10.93 A=16.66 F=59.99");

        let t = StageTimings { input: Some(120), ..t };
        assert!(t.to_string().starts_with("I=0.12 U=1.23"));
    }

    #[test]
    fn zero_total_reports_zero_fps() {
        let t = StageTimings::default();
        assert_eq!(t.fps(), 0.0);
        assert_eq!(t.to_string(), "U=0.00 C=0.00 D=0.00 V=0.00 A=0.00 F=0.00");
    }
}
