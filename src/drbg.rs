//! Process-wide deterministic random bit generator.
//!
//! HMAC_DRBG (NIST SP 800-90A) instantiated with HMAC-SHA256. The
//! process keeps one lazily seeded generator behind a mutex; hosts may
//! register polling entropy sources before the first draw, otherwise
//! the operating system RNG seeds the instance. Draws are serialized by
//! the lock, so the generator is safe to share between threads.

use std::sync::{Mutex, MutexGuard};

use hmac::{Hmac, Mac};
use rand_core::{OsRng, RngCore};
use sha2::Sha256;
use zeroize::Zeroize;

use crate::errors::{Error, Result};

/// Callback polled for seed material.
///
/// Fills as much of `buf` as it can and returns the number of bytes
/// written. Returning zero means the source is currently exhausted.
pub type EntropySource = fn(buf: &mut [u8]) -> Result<usize>;

const SEED_LENGTH: usize = 48;
const RESEED_INTERVAL: u64 = 1 << 10;
const MAX_SOURCE_POLLS: usize = 64;

/// HMAC_DRBG working state.
///
/// The process singleton wraps one of these; standalone instances are
/// constructible for callers that need a private deterministic stream.
pub struct HmacDrbg {
    key: [u8; 32],
    value: [u8; 32],
    requests: u64,
}

impl HmacDrbg {
    /// Instantiate from seed material of any length.
    pub fn new(seed: &[u8]) -> Self {
        let mut drbg = Self {
            key: [0u8; 32],
            value: [1u8; 32],
            requests: 0,
        };
        drbg.update(Some(seed));
        drbg
    }

    /// Mix fresh seed material into the state.
    pub fn reseed(&mut self, seed: &[u8]) {
        self.update(Some(seed));
        self.requests = 0;
    }

    /// True once enough requests have been served that the generator
    /// wants fresh seed material.
    pub fn needs_reseed(&self) -> bool {
        self.requests >= RESEED_INTERVAL
    }

    /// Produce `out.len()` bytes.
    pub fn fill_bytes(&mut self, out: &mut [u8]) {
        for chunk in out.chunks_mut(self.value.len()) {
            self.value = hmac(&self.key, &[&self.value]);
            chunk.copy_from_slice(&self.value[..chunk.len()]);
        }
        self.update(None);
        self.requests += 1;
    }

    fn update(&mut self, seed: Option<&[u8]>) {
        let provided = seed.unwrap_or(&[]);
        self.key = hmac(&self.key, &[&self.value, &[0x00], provided]);
        self.value = hmac(&self.key, &[&self.value]);
        if seed.is_some() {
            self.key = hmac(&self.key, &[&self.value, &[0x01], provided]);
            self.value = hmac(&self.key, &[&self.value]);
        }
    }
}

impl Drop for HmacDrbg {
    fn drop(&mut self) {
        self.key.zeroize();
        self.value.zeroize();
    }
}

fn hmac(key: &[u8; 32], parts: &[&[u8]]) -> [u8; 32] {
    let mut mac =
        Hmac::<Sha256>::new_from_slice(key).expect("HMAC accepts keys of any length");
    for part in parts {
        mac.update(part);
    }
    mac.finalize().into_bytes().into()
}

struct SourceEntry {
    source: EntropySource,
    threshold: usize,
}

struct Global {
    sources: Vec<SourceEntry>,
    drbg: Option<HmacDrbg>,
}

static GLOBAL: Mutex<Global> = Mutex::new(Global {
    sources: Vec::new(),
    drbg: None,
});

fn lock() -> MutexGuard<'static, Global> {
    match GLOBAL.lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    }
}

/// Register a polling entropy source.
///
/// `threshold` is the minimum number of bytes the source must deliver
/// before draws are allowed. A source that cannot meet its threshold
/// makes seeding fail with [`Error::OutOfEntropy`]. If the generator is
/// already instantiated it is reseeded against the new source set.
pub fn add_entropy_source(source: EntropySource, threshold: usize) -> Result<()> {
    let mut global = lock();
    global.sources.push(SourceEntry { source, threshold });
    if global.drbg.is_some() {
        let mut seed = gather(&global.sources)?;
        if let Some(drbg) = &mut global.drbg {
            drbg.reseed(&seed);
        }
        seed.zeroize();
    }
    Ok(())
}

/// Fill `out` from the process DRBG, seeding it on first use.
pub fn fill_bytes(out: &mut [u8]) -> Result<()> {
    let mut global = lock();
    let reseed_due = matches!(&global.drbg, Some(drbg) if drbg.needs_reseed());
    if global.drbg.is_none() || reseed_due {
        let mut seed = gather(&global.sources)?;
        match global.drbg.take() {
            Some(mut drbg) => {
                drbg.reseed(&seed);
                global.drbg = Some(drbg);
            }
            None => global.drbg = Some(HmacDrbg::new(&seed)),
        }
        seed.zeroize();
    }
    let drbg = global.drbg.as_mut().ok_or(Error::InternalError)?;
    drbg.fill_bytes(out);
    Ok(())
}

fn gather(sources: &[SourceEntry]) -> Result<Vec<u8>> {
    let mut seed = Vec::with_capacity(SEED_LENGTH);
    if sources.is_empty() {
        let mut os = [0u8; SEED_LENGTH];
        OsRng
            .try_fill_bytes(&mut os)
            .map_err(|_| Error::OutOfEntropy)?;
        seed.extend_from_slice(&os);
        os.zeroize();
        return Ok(seed);
    }
    for entry in sources {
        let mut collected = 0;
        let mut polls = 0;
        while collected < entry.threshold {
            let mut buf = [0u8; 64];
            let want = (entry.threshold - collected).min(buf.len());
            let got = (entry.source)(&mut buf[..want])?;
            if got == 0 || got > want {
                return Err(Error::OutOfEntropy);
            }
            seed.extend_from_slice(&buf[..got]);
            buf.zeroize();
            collected += got;
            polls += 1;
            if polls > MAX_SOURCE_POLLS {
                return Err(Error::OutOfEntropy);
            }
        }
    }
    Ok(seed)
}
