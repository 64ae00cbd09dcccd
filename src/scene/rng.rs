/// Marsaglia xorshift32. Small, seedable and good enough for demo spawns.
#[derive(Debug, Clone)]
pub struct XorShift32 {
    state: u32,
}

impl XorShift32 {
    pub const fn new(seed: u32) -> Self {
        // zero is a fixed point of the generator
        let state = if seed == 0 { 0x9E37_79B9 } else { seed };
        Self { state }
    }

    pub fn next_u32(&mut self) -> u32 {
        let mut x = self.state;
        x ^= x << 13;
        x ^= x >> 17;
        x ^= x << 5;
        self.state = x;
        x
    }

    /// Uniform-ish value in `0..bound`; 0 when `bound` is 0
    pub fn below(&mut self, bound: u32) -> u32 {
        match bound {
            0 => 0,
            n => self.next_u32() % n,
        }
    }

    /// Value in `lo..=hi`
    pub fn between(&mut self, lo: i16, hi: i16) -> i16 {
        let span = (i32::from(hi) - i32::from(lo) + 1).max(1) as u32;
        (i32::from(lo) + self.below(span) as i32) as i16
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sequence_is_reproducible() {
        let mut a = XorShift32::new(7);
        let mut b = XorShift32::new(7);
        for _ in 0..32 {
            assert_eq!(a.next_u32(), b.next_u32());
        }
        assert_ne!(XorShift32::new(0).next_u32(), 0);
    }

    #[test]
    fn ranges_hold() {
        let mut rng = XorShift32::new(1);
        for _ in 0..1000 {
            assert!(rng.below(10) < 10);
            let v = rng.between(-5, 5);
            assert!((-5..=5).contains(&v));
        }
        assert_eq!(rng.below(0), 0);
    }
}
