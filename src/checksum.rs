//! Incremental checksum accumulation over the chunks of a download.

use std::fmt;
use std::str::FromStr;

use md5::Md5;
use sha1::Sha1;
use sha2::digest::{Digest, DynDigest};
use sha2::{Sha224, Sha256, Sha384, Sha512};

/// Supported checksum algorithms.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Algorithm {
    Md5,
    Sha1,
    Sha224,
    Sha256,
    Sha384,
    Sha512,
}

impl Algorithm {
    fn hasher(self) -> Box<dyn DynDigest> {
        match self {
            Algorithm::Md5 => Box::new(Md5::new()),
            Algorithm::Sha1 => Box::new(Sha1::new()),
            Algorithm::Sha224 => Box::new(Sha224::new()),
            Algorithm::Sha256 => Box::new(Sha256::new()),
            Algorithm::Sha384 => Box::new(Sha384::new()),
            Algorithm::Sha512 => Box::new(Sha512::new()),
        }
    }
}

impl fmt::Display for Algorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Algorithm::Md5 => write!(f, "MD5"),
            Algorithm::Sha1 => write!(f, "SHA1"),
            Algorithm::Sha224 => write!(f, "SHA224"),
            Algorithm::Sha256 => write!(f, "SHA256"),
            Algorithm::Sha384 => write!(f, "SHA384"),
            Algorithm::Sha512 => write!(f, "SHA512"),
        }
    }
}

#[derive(Debug, thiserror::Error)]
#[error("unsupported checksum type {0:?}")]
pub struct UnknownAlgorithm(String);

impl FromStr for Algorithm {
    type Err = UnknownAlgorithm;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "md5" => Ok(Algorithm::Md5),
            "sha1" | "sha-1" => Ok(Algorithm::Sha1),
            "sha224" | "sha-224" => Ok(Algorithm::Sha224),
            "sha256" | "sha-256" => Ok(Algorithm::Sha256),
            "sha384" | "sha-384" => Ok(Algorithm::Sha384),
            "sha512" | "sha-512" => Ok(Algorithm::Sha512),
            _ => Err(UnknownAlgorithm(s.to_string())),
        }
    }
}

/// One running digest, fed chunk by chunk while the body streams in.
pub struct Accumulator {
    algorithm: Algorithm,
    state: Box<dyn DynDigest>,
}

impl Accumulator {
    pub fn new(algorithm: Algorithm) -> Self {
        Self {
            algorithm,
            state: algorithm.hasher(),
        }
    }

    pub fn algorithm(&self) -> Algorithm {
        self.algorithm
    }

    pub fn update(&mut self, chunk: &[u8]) {
        self.state.update(chunk);
    }

    /// Consumes the accumulator and returns the lowercase hex digest.
    pub fn finalize_hex(self) -> String {
        hex::encode(self.state.finalize())
    }
}

impl fmt::Debug for Accumulator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Accumulator")
            .field("algorithm", &self.algorithm)
            .finish_non_exhaustive()
    }
}

/// The set of accumulators a transfer feeds in parallel.
///
/// Built from user-supplied names; unknown names are logged as warnings and
/// skipped, duplicates are collapsed. The set preserves the order in which
/// algorithms were first requested.
#[derive(Debug, Default)]
pub struct AccumulatorSet {
    accumulators: Vec<Accumulator>,
}

impl AccumulatorSet {
    pub fn resolve<S: AsRef<str>>(names: &[S]) -> Self {
        let mut accumulators: Vec<Accumulator> = Vec::new();
        for name in names {
            match name.as_ref().parse::<Algorithm>() {
                Ok(algorithm) => {
                    if accumulators.iter().any(|a| a.algorithm() == algorithm) {
                        continue;
                    }
                    accumulators.push(Accumulator::new(algorithm));
                }
                Err(err) => tracing::warn!("{err}"),
            }
        }
        Self { accumulators }
    }

    pub fn is_empty(&self) -> bool {
        self.accumulators.is_empty()
    }

    pub fn update(&mut self, chunk: &[u8]) {
        for accumulator in &mut self.accumulators {
            accumulator.update(chunk);
        }
    }

    pub fn finalize_hex(self) -> Vec<(Algorithm, String)> {
        self.accumulators
            .into_iter()
            .map(|a| (a.algorithm(), a.finalize_hex()))
            .collect()
    }
}
