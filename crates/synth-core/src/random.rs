//! Shared random source and string helpers.
//!
//! Every generator draws from one [`RandomSource`]. A seeded source makes a
//! whole engine reproducible; clones share the same underlying stream.

use std::ops::RangeInclusive;
use std::sync::Arc;

use parking_lot::Mutex;
use rand::distributions::{Alphanumeric, DistString, Uniform};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Printable ASCII, space through tilde.
const ASCII_PRINTABLE: RangeInclusive<char> = ' '..='~';

#[derive(Clone)]
pub struct RandomSource {
    rng: Arc<Mutex<StdRng>>,
}

impl RandomSource {
    pub fn from_entropy() -> Self {
        Self::from_rng(StdRng::from_entropy())
    }

    pub fn seeded(seed: u64) -> Self {
        Self::from_rng(StdRng::seed_from_u64(seed))
    }

    /// Seeded when a seed is given, entropy otherwise.
    pub fn from_seed(seed: Option<u64>) -> Self {
        match seed {
            Some(seed) => Self::seeded(seed),
            None => Self::from_entropy(),
        }
    }

    fn from_rng(rng: StdRng) -> Self {
        Self {
            rng: Arc::new(Mutex::new(rng)),
        }
    }

    /// Run `f` with exclusive access to the generator.
    pub fn with<R>(&self, f: impl FnOnce(&mut StdRng) -> R) -> R {
        let mut rng = self.rng.lock();
        f(&mut rng)
    }

    pub fn gen_bool(&self) -> bool {
        self.with(|rng| rng.gen_bool(0.5))
    }

    pub fn gen_index(&self, len: usize) -> usize {
        self.with(|rng| rng.gen_range(0..len))
    }

    pub fn gen_len(&self, range: RangeInclusive<usize>) -> usize {
        self.with(|rng| rng.gen_range(range))
    }

    /// `len` arbitrary Unicode scalar values.
    pub fn any_string(&self, len: usize) -> String {
        self.with(|rng| (0..len).map(|_| rng.gen::<char>()).collect())
    }

    /// `len` printable ASCII characters.
    pub fn ascii_string(&self, len: usize) -> String {
        self.with(|rng| {
            let dist = Uniform::new_inclusive(*ASCII_PRINTABLE.start(), *ASCII_PRINTABLE.end());
            (0..len).map(|_| rng.sample(dist)).collect()
        })
    }

    /// `len` ASCII letters.
    pub fn alphabetic_string(&self, len: usize) -> String {
        self.with(|rng| {
            (0..len)
                .map(|_| {
                    let offset = rng.gen_range(0..26u8);
                    if rng.gen_bool(0.5) {
                        (b'a' + offset) as char
                    } else {
                        (b'A' + offset) as char
                    }
                })
                .collect()
        })
    }

    /// `len` ASCII letters and digits.
    pub fn alphanumeric_string(&self, len: usize) -> String {
        self.with(|rng| Alphanumeric.sample_string(rng, len))
    }

    pub fn printable_char(&self) -> char {
        self.with(|rng| rng.gen_range(ASCII_PRINTABLE))
    }
}

impl std::fmt::Debug for RandomSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("RandomSource")
    }
}
