//! Difficulty value object and the leading-zero predicate.

use super::errors::PowError;

/// Number of leading zero hex digits a block hash must carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Difficulty(u8);

impl Difficulty {
    /// Largest meaningful difficulty: a SHA-256 hex digest has 64 digits.
    pub const MAX: u8 = 64;

    pub fn new(zeros: u8) -> Result<Self, PowError> {
        if zeros == 0 || zeros > Self::MAX {
            return Err(PowError::InvalidDifficulty(zeros));
        }
        Ok(Self(zeros))
    }

    pub fn zeros(self) -> u8 {
        self.0
    }

    /// True if `digest` starts with at least this many `'0'` characters.
    pub fn is_met_by(self, digest: &str) -> bool {
        meets_difficulty(digest, self.0 as usize)
    }
}

/// True if `digest` starts with at least `zeros` `'0'` characters.
#[inline]
pub fn meets_difficulty(digest: &str, zeros: usize) -> bool {
    digest.len() >= zeros && digest.bytes().take(zeros).all(|b| b == b'0')
}
