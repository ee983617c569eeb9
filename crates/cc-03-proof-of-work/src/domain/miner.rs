//! # Nonce Search and Verification
//!
//! `mine` is an unbounded sequential search. `mine_parallel` shards the nonce
//! space across scoped threads: worker `i` of `n` tries `i, i+n, i+2n, ...`
//! and the first worker to report a hit stops the others.

use super::difficulty::Difficulty;
use super::errors::PowError;
use shared_types::{compute_hash, Block};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

/// A winning nonce and the digest it produces.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Solution {
    pub nonce: u64,
    pub digest: String,
}

impl Solution {
    /// Stamp the nonce onto `block`.
    pub fn apply(&self, mut block: Block) -> Block {
        block.nonce = self.nonce;
        block
    }
}

/// Proof-of-work engine bound to one difficulty.
#[derive(Debug, Clone, Copy)]
pub struct ProofOfWork {
    difficulty: Difficulty,
}

impl ProofOfWork {
    pub fn new(difficulty: Difficulty) -> Self {
        Self { difficulty }
    }

    /// Engine at `zeros` leading hex zeros.
    pub fn with_zeros(zeros: u8) -> Result<Self, PowError> {
        Ok(Self::new(Difficulty::new(zeros)?))
    }

    pub fn difficulty(&self) -> Difficulty {
        self.difficulty
    }

    /// Search nonces from 0 upwards until the block hash meets the difficulty.
    #[tracing::instrument(skip(self, block), fields(index = block.index, difficulty = self.difficulty.zeros()))]
    pub fn mine(&self, block: &Block) -> Result<Solution, PowError> {
        let mut candidate = block.clone();
        let mut nonce = 0u64;
        loop {
            candidate.nonce = nonce;
            let digest = compute_hash(&candidate);
            if self.difficulty.is_met_by(&digest) {
                tracing::debug!(nonce, %digest, "Proof of work found");
                return Ok(Solution { nonce, digest });
            }
            nonce = nonce
                .checked_add(1)
                .ok_or(PowError::Exhausted(self.difficulty.zeros()))?;
        }
    }

    /// Search the nonce space on `workers` threads; the first hit reported wins.
    #[tracing::instrument(skip(self, block), fields(index = block.index, difficulty = self.difficulty.zeros()))]
    pub fn mine_parallel(&self, block: &Block, workers: usize) -> Result<Solution, PowError> {
        let workers = workers.max(1);
        if workers == 1 {
            return self.mine(block);
        }

        let found = AtomicBool::new(false);
        let winner: Mutex<Option<Solution>> = Mutex::new(None);
        let stride = workers as u64;

        let joined = std::thread::scope(|scope| {
            let handles: Vec<_> = (0..stride)
                .map(|start| {
                    let found = &found;
                    let winner = &winner;
                    let mut candidate = block.clone();
                    let difficulty = self.difficulty;
                    scope.spawn(move || {
                        let mut nonce = start;
                        while !found.load(Ordering::Relaxed) {
                            candidate.nonce = nonce;
                            let digest = compute_hash(&candidate);
                            if difficulty.is_met_by(&digest) {
                                if !found.swap(true, Ordering::AcqRel) {
                                    if let Ok(mut slot) = winner.lock() {
                                        *slot = Some(Solution { nonce, digest });
                                    }
                                }
                                break;
                            }
                            match nonce.checked_add(stride) {
                                Some(next) => nonce = next,
                                None => break,
                            }
                        }
                    })
                })
                .collect();
            let mut all_ok = true;
            for handle in handles {
                all_ok &= handle.join().is_ok();
            }
            all_ok
        });

        if !joined {
            return Err(PowError::WorkerFailed);
        }

        let solution = winner
            .into_inner()
            .map_err(|_| PowError::WorkerFailed)?
            .ok_or(PowError::Exhausted(self.difficulty.zeros()))?;
        tracing::debug!(nonce = solution.nonce, digest = %solution.digest, workers, "Proof of work found");
        Ok(solution)
    }

    /// True iff `claimed_digest` meets the difficulty AND equals the block's
    /// recomputed hash.
    pub fn verify(&self, block: &Block, claimed_digest: &str) -> bool {
        self.difficulty.is_met_by(claimed_digest) && compute_hash(block) == claimed_digest
    }

    /// True iff the block's own hash meets the difficulty.
    pub fn is_sealed(&self, block: &Block) -> bool {
        self.difficulty.is_met_by(&compute_hash(block))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use shared_types::Transaction;

    fn template(ts: u64) -> Block {
        Block::new(
            1,
            vec![Transaction::new("alice", "bob", 10.0)],
            ts,
            "00aa",
        )
    }

    #[test]
    fn test_mine_then_verify() {
        let pow = ProofOfWork::with_zeros(2).unwrap();
        let block = template(1);
        let solution = pow.mine(&block).unwrap();
        let sealed = solution.apply(block);
        assert!(solution.digest.starts_with("00"));
        assert!(pow.verify(&sealed, &solution.digest));
        assert!(pow.is_sealed(&sealed));
    }

    #[test]
    fn test_mine_returns_first_satisfying_nonce() {
        let pow = ProofOfWork::with_zeros(1).unwrap();
        let block = template(2);
        let solution = pow.mine(&block).unwrap();
        for nonce in 0..solution.nonce {
            let mut b = block.clone();
            b.nonce = nonce;
            assert!(!pow.is_sealed(&b));
        }
    }

    #[test]
    fn test_verify_rejects_mismatched_digest() {
        let pow = ProofOfWork::with_zeros(2).unwrap();
        let block = template(3);
        let solution = pow.mine(&block).unwrap();
        let sealed = solution.apply(block);

        // Right shape, wrong block.
        let other = pow.mine(&template(4)).unwrap();
        assert!(!pow.verify(&sealed, &other.digest));
    }

    #[test]
    fn test_verify_rejects_insufficient_zeros() {
        let pow = ProofOfWork::with_zeros(2).unwrap();
        let mut block = template(5);
        // Find a nonce whose hash does NOT meet the difficulty and claim it.
        let digest = loop {
            let d = compute_hash(&block);
            if !d.starts_with("00") {
                break d;
            }
            block.nonce += 1;
        };
        assert!(!pow.verify(&block, &digest));
    }

    #[test]
    fn test_verify_rejects_tampered_block() {
        let pow = ProofOfWork::with_zeros(2).unwrap();
        let block = template(6);
        let solution = pow.mine(&block).unwrap();
        let mut sealed = solution.apply(block);
        sealed.transactions[0].amount = 1_000.0;
        assert!(!pow.verify(&sealed, &solution.digest));
    }

    #[test]
    fn test_mine_parallel_finds_valid_nonce() {
        let pow = ProofOfWork::with_zeros(3).unwrap();
        let block = template(7);
        let solution = pow.mine_parallel(&block, 4).unwrap();
        let sealed = solution.apply(block);
        assert!(pow.verify(&sealed, &solution.digest));
    }

    #[test]
    fn test_mine_parallel_single_worker_matches_sequential() {
        let pow = ProofOfWork::with_zeros(2).unwrap();
        let block = template(8);
        assert_eq!(
            pow.mine_parallel(&block, 1).unwrap(),
            pow.mine(&block).unwrap()
        );
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(12))]

        #[test]
        fn prop_verify_accepts_mined(ts in any::<u64>(), zeros in 1u8..=3) {
            let pow = ProofOfWork::with_zeros(zeros).unwrap();
            let block = template(ts);
            let solution = pow.mine(&block).unwrap();
            prop_assert!(pow.verify(&solution.apply(block), &solution.digest));
        }
    }
}
