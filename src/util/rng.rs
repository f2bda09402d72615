// Copyright (c) 2024 Mike Tsao

//! Provides the random-number generator behind noise sources and reverb
//! impulses.

use crate::engine::AudioBuffer;
use byteorder::{BigEndian, ByteOrder};
use delegate::delegate;

/// A pseudorandom number generator (PRNG) for applications such as
/// digital-audio libraries that don't require cryptographically secure random
/// numbers.
#[derive(Debug)]
pub struct Rng(oorandom::Rand64);
impl Default for Rng {
    fn default() -> Self {
        // We want to panic if this fails, because it indicates that a core OS
        // facility isn't functioning.
        Self::new_with_seed(Self::generate_seed().unwrap())
    }
}
#[allow(missing_docs)]
impl Rng {
    /// The seed used when the OS has no randomness to offer.
    pub const FALLBACK_SEED: u128 = 0x5eed_0f_c0ffee;

    /// Pass the same number to [Rng::new_with_seed()] to get the same stream
    /// back again. Good for reproducing a particular noise realization.
    pub fn new_with_seed(seed: u128) -> Self {
        Self(oorandom::Rand64::new(seed))
    }

    /// Seeds from the OS. If the OS can't supply a seed, logs a warning and
    /// uses [Rng::FALLBACK_SEED] instead of panicking.
    pub fn new_from_os_or_fallback() -> Self {
        Self::new_with_seed(Self::generate_seed().unwrap_or_else(|e| {
            log::warn!("couldn't get a random seed from the OS ({e}); using a fixed seed");
            Self::FALLBACK_SEED
        }))
    }

    /// Create a sufficiently high-quality random number that's suitable for
    /// [Rng].
    pub fn generate_seed() -> anyhow::Result<u128> {
        let mut bytes = [0u8; 16];

        getrandom::getrandom(&mut bytes)?;
        Ok(BigEndian::read_u128(&bytes))
    }

    delegate! {
        to self.0 {
            pub fn rand_u64(&mut self) -> u64;
            pub fn rand_float(&mut self) -> f64;
        }
    }

    /// A uniformly distributed sample in [-1.0, 1.0).
    pub fn rand_bipolar(&mut self) -> f32 {
        (self.rand_float() * 2.0 - 1.0) as f32
    }

    /// Overwrites every channel of the buffer with white noise, each sample
    /// multiplied by `shape(frame_index, frame_count)`.
    pub fn fill_noise(&mut self, buffer: &mut AudioBuffer, shape: impl Fn(usize, usize) -> f32) {
        let frames = buffer.len();
        for channel in 0..buffer.channel_count() {
            if let Some(samples) = buffer.channel_mut(channel) {
                for (i, sample) in samples.iter_mut().enumerate() {
                    *sample = self.rand_bipolar() * shape(i, frames);
                }
            }
        }
    }
}
