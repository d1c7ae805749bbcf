use std::{fmt, str::FromStr};

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Deserializer, Serialize, Serializer, de};

pub const SEED_LENGTH: usize = 16; // Hex digits in the canonical form of a 64-bit state.

/// The state of the maze's pseudo-random generator.
///
/// Its canonical form is a 16-digit upper-case hex string. Every round of
/// wall decisions starts from `rng()` and ends by drawing the next seed from
/// the same generator, so storing a seed is enough to replay or roll back
/// everything that follows it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Seed(u64);

impl Seed {
    pub fn new(state: u64) -> Self {
        Self(state)
    }

    pub fn random() -> Self {
        Self(rand::random())
    }

    pub fn state(&self) -> u64 {
        self.0
    }

    pub fn rng(&self) -> ChaCha8Rng {
        ChaCha8Rng::seed_from_u64(self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SeedError {
    Empty,
    TooLong,
    InvalidCharacter(char),
}

impl fmt::Display for SeedError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SeedError::Empty => write!(f, "seed cannot be empty"),
            SeedError::TooLong => write!(f, "seed is longer than {} hex digits", SEED_LENGTH),
            SeedError::InvalidCharacter(c) => {
                write!(f, "seed contains invalid character '{}'", c)
            }
        }
    }
}

impl std::error::Error for SeedError {}

impl FromStr for Seed {
    type Err = SeedError;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        let trimmed = input.trim();

        if trimmed.is_empty() {
            return Err(SeedError::Empty);
        }

        if let Some(invalid) = trimmed.chars().find(|ch| !ch.is_ascii_hexdigit()) {
            return Err(SeedError::InvalidCharacter(invalid));
        }

        if trimmed.len() > SEED_LENGTH {
            return Err(SeedError::TooLong);
        }

        // Only hex digits remain and there are at most 16 of them, so this
        // cannot overflow.
        u64::from_str_radix(trimmed, 16)
            .map(Seed)
            .map_err(|_| SeedError::TooLong)
    }
}

impl fmt::Display for Seed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:016X}", self.0)
    }
}

impl Serialize for Seed {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Seed {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let string = String::deserialize(deserializer)?;
        string.parse().map_err(de::Error::custom)
    }
}
