/// Seedable SplitMix64 generator.
///
/// The only randomness source in the crate. Scripts draw from the scheduler-owned instance
/// (seeded from [`SchedulerConfig::seed`](crate::SchedulerConfig)) so two runs with the same seed
/// produce the same scene.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Rng64 {
    state: u64,
}

impl Rng64 {
    /// Create a generator from an explicit seed.
    pub fn new(seed: u64) -> Self {
        Self { state: seed }
    }

    /// Next raw 64-bit value.
    pub fn next_u64(&mut self) -> u64 {
        self.state = self.state.wrapping_add(0x9E37_79B9_7F4A_7C15);
        let mut z = self.state;
        z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
        z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
        z ^ (z >> 31)
    }

    /// Uniform float in `[0, 1)` with 53 bits of precision.
    pub fn next_f64_01(&mut self) -> f64 {
        let v = self.next_u64() >> 11;
        (v as f64) * (1.0 / ((1u64 << 53) as f64))
    }

    /// Uniform float in `[from, to)`.
    pub fn next_float(&mut self, from: f64, to: f64) -> f64 {
        from + (to - from) * self.next_f64_01()
    }

    /// Uniform integer in the half-open range `[from, to)`.
    ///
    /// Returns `from` when the range is empty.
    pub fn next_int(&mut self, from: i64, to: i64) -> i64 {
        if to <= from {
            return from;
        }
        let span = (to as i128 - from as i128) as u128;
        let pick = (u128::from(self.next_u64()) * span) >> 64;
        (from as i128 + pick as i128) as i64
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/rng.rs"]
mod tests;
