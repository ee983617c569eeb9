//! # Ledger Rules
//!
//! Pure functions over a chain snapshot. The chain is the only source of
//! truth for balances; no address ever carries a stored balance.

use super::outcomes::{Assets, RejectionReason, TransactionRejection};
use cc_03_proof_of_work::ProofOfWork;
use shared_types::{
    gas_share, required_funds, Block, Transaction, MINED_BLOCK_TX_COUNT, MINER_GAS_TX,
    OPERATOR_GAS_TX,
};

/// Balance of `address`: every transfer it sent counts negative, every
/// transfer it received counts positive. A transfer to oneself counts only
/// as a debit.
pub fn balance_of(chain: &[Block], address: &str) -> f64 {
    chain
        .iter()
        .flat_map(|block| &block.transactions)
        .fold(0.0, |balance, tx| {
            if tx.from_address == address {
                balance - tx.amount
            } else if tx.to_address == address {
                balance + tx.amount
            } else {
                balance
            }
        })
}

/// Payloads of every transfer received by `address`, oldest first.
pub fn assets_of(chain: &[Block], address: &str) -> Assets {
    chain
        .iter()
        .flat_map(|block| &block.transactions)
        .filter(|tx| tx.to_address == address && !tx.data.is_null())
        .map(|tx| tx.data.clone())
        .collect()
}

/// Where a fetched chain breaks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChainFault {
    pub index: usize,
    pub reason: &'static str,
}

/// Check hash linkage and proof of work for every block after genesis.
///
/// The genesis block is trusted as-is; historical signatures are not
/// re-checked.
pub fn validate_chain(pow: &ProofOfWork, chain: &[Block]) -> Result<(), ChainFault> {
    if chain.is_empty() {
        return Err(ChainFault {
            index: 0,
            reason: "empty chain",
        });
    }
    for (index, pair) in chain.windows(2).enumerate() {
        let (prev, block) = (&pair[0], &pair[1]);
        if block.previous_hash != prev.hash() {
            return Err(ChainFault {
                index: index + 1,
                reason: "broken hash link",
            });
        }
        if !pow.is_sealed(block) {
            return Err(ChainFault {
                index: index + 1,
                reason: "insufficient proof of work",
            });
        }
    }
    Ok(())
}

/// Transaction-count and gas-split rules for a mined block.
pub fn check_block_shape(block: &Block) -> Result<(), RejectionReason> {
    let found = block.transactions.len();
    if found < MINED_BLOCK_TX_COUNT {
        return Err(RejectionReason::WrongTransactionCount { found });
    }
    if found > MINED_BLOCK_TX_COUNT {
        return Err(RejectionReason::TooManyTransactions { found });
    }

    let txs = &block.transactions;
    let expected = gas_share(txs[0].amount);
    let operator = txs[OPERATOR_GAS_TX].amount;
    let miner = txs[MINER_GAS_TX].amount;
    if operator != expected || miner != expected {
        return Err(RejectionReason::GasMismatch {
            expected,
            operator,
            miner,
        });
    }
    Ok(())
}

/// Stateless admission rules for a submitted transfer.
pub fn check_transaction_shape(
    tx: &Transaction,
    operator: &str,
) -> Result<(), TransactionRejection> {
    // `!(x > 0)` also catches NaN.
    if !(tx.amount > 0.0) || !tx.amount.is_finite() {
        return Err(TransactionRejection::NonPositiveAmount);
    }
    if !tx.is_signed() {
        return Err(TransactionRejection::MissingSignature);
    }
    if tx.to_address.is_empty() {
        return Err(TransactionRejection::EmptyRecipient);
    }
    if tx.to_address == tx.from_address {
        return Err(TransactionRejection::SelfSpend);
    }
    if tx.to_address == operator {
        return Err(TransactionRejection::OperatorRecipient);
    }
    Ok(())
}

/// Funds rule: the sender must cover the amount plus the gas overhead.
pub fn check_funds(chain: &[Block], tx: &Transaction) -> Result<(), TransactionRejection> {
    let balance = balance_of(chain, &tx.from_address);
    let required = required_funds(tx.amount);
    if balance < required {
        return Err(TransactionRejection::InsufficientFunds { balance, required });
    }
    Ok(())
}
