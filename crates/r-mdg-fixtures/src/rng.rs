//! ---
//! ems_section: "11-simulation"
//! ems_subsection: "02-metering-fixtures"
//! ems_type: "source"
//! ems_scope: "code"
//! ems_description: "Metering fixture synthesis and export."
//! ems_version: "v0.1.0"
//! ems_owner: "tbd"
//! ---
//! Random source handed explicitly to every generator.
use std::ops::RangeInclusive;

use rand::rngs::StdRng;
use rand::seq::index;
use rand::{Rng, SeedableRng};

/// Total length of generated identifiers, prefix included.
pub const ID_LENGTH: usize = 16;

/// Round half away from zero to `digits` decimal places.
pub fn round_to(value: f64, digits: i32) -> f64 {
    let factor = 10f64.powi(digits);
    (value * factor).round() / factor
}

/// Seedable random stream with the sampling helpers fixture generators need.
#[derive(Debug, Clone)]
pub struct FixtureRng {
    inner: StdRng,
}

impl FixtureRng {
    pub fn seeded(seed: u64) -> Self {
        Self {
            inner: StdRng::seed_from_u64(seed),
        }
    }

    pub fn from_entropy() -> Self {
        Self {
            inner: StdRng::from_entropy(),
        }
    }

    /// Seeded when `seed` is present, entropy otherwise.
    pub fn from_optional_seed(seed: Option<u64>) -> Self {
        match seed {
            Some(seed) => Self::seeded(seed),
            None => Self::from_entropy(),
        }
    }

    /// Uniform real in `[low, high]`.
    pub fn uniform(&mut self, low: f64, high: f64) -> f64 {
        if high <= low {
            return low;
        }
        self.inner.gen_range(low..=high)
    }

    /// Uniform real in `[low, high]` rounded to `digits` decimals.
    pub fn uniform_rounded(&mut self, low: f64, high: f64, digits: i32) -> f64 {
        round_to(self.uniform(low, high), digits)
    }

    pub fn int(&mut self, range: RangeInclusive<u64>) -> u64 {
        self.inner.gen_range(range)
    }

    pub fn index(&mut self, len: usize) -> usize {
        self.inner.gen_range(0..len)
    }

    /// Bernoulli draw with success probability `p`.
    pub fn chance(&mut self, p: f64) -> bool {
        self.inner.gen_bool(p.clamp(0.0, 1.0))
    }

    /// Pick one entry of a fixed, non-empty vocabulary.
    pub fn pick<T: Copy, const N: usize>(&mut self, items: &[T; N]) -> T {
        items[self.inner.gen_range(0..N)]
    }

    /// Pick one entry of a runtime slice.
    pub fn choose<'a, T>(&mut self, items: &'a [T]) -> Option<&'a T> {
        if items.is_empty() {
            return None;
        }
        Some(&items[self.index(items.len())])
    }

    /// Sample without replacement, clamped to `min(amount, items.len())`.
    pub fn sample<'a, T>(&mut self, items: &'a [T], amount: usize) -> Vec<&'a T> {
        let amount = amount.min(items.len());
        index::sample(&mut self.inner, items.len(), amount)
            .into_iter()
            .map(|i| &items[i])
            .collect()
    }

    /// `len` random decimal digits.
    pub fn digits(&mut self, len: usize) -> String {
        (0..len)
            .map(|_| char::from(b'0' + self.inner.gen_range(0..10u8)))
            .collect()
    }

    /// `prefix` padded with random digits up to [`ID_LENGTH`] characters.
    pub fn id(&mut self, prefix: &str) -> String {
        let pad = ID_LENGTH.saturating_sub(prefix.chars().count());
        format!("{}{}", prefix, self.digits(pad))
    }

    /// `prefix` followed by a uniform integer from `range`.
    pub fn tagged(&mut self, prefix: &str, range: RangeInclusive<u64>) -> String {
        format!("{}{}", prefix, self.int(range))
    }

    /// Dotted quad with every octet in `1..=255`.
    pub fn ipv4(&mut self) -> String {
        format!(
            "{}.{}.{}.{}",
            self.int(1..=255),
            self.int(1..=255),
            self.int(1..=255),
            self.int(1..=255)
        )
    }

    /// Binary condition flag rendered as `0`/`1`.
    pub fn flag(&mut self) -> &'static str {
        self.pick(&["0", "1"])
    }
}
