use rust_decimal::Decimal;

use crate::common::errors::{EngineError, Result};

/// Remaining allocatable capital for a single pass
///
/// Created from a fresh capital figure at the start of a pass and dropped at
/// the end. The balance can never go below zero.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CapitalLedger {
    initial: Decimal,
    remaining: Decimal,
    withdrawals: usize,
}

impl CapitalLedger {
    pub fn new(capital: Decimal) -> Result<Self> {
        if capital.is_sign_negative() && !capital.is_zero() {
            return Err(EngineError::Configuration(format!(
                "capital must not be negative, got {}",
                capital
            )));
        }
        Ok(Self {
            initial: capital,
            remaining: capital,
            withdrawals: 0,
        })
    }

    pub fn remaining(&self) -> Decimal {
        self.remaining
    }

    /// Total withdrawn so far
    pub fn committed(&self) -> Decimal {
        self.initial - self.remaining
    }

    /// Number of successful withdrawals
    pub fn withdrawals(&self) -> usize {
        self.withdrawals
    }

    /// Remove `amount` from the balance
    ///
    /// Refuses negative amounts and any amount larger than the balance,
    /// leaving the ledger untouched.
    pub fn withdraw(&mut self, amount: Decimal) -> Result<Decimal> {
        if amount.is_sign_negative() && !amount.is_zero() {
            return Err(EngineError::Internal(format!(
                "negative withdrawal of {}",
                amount
            )));
        }
        if amount > self.remaining {
            return Err(EngineError::InsufficientCapital {
                requested: amount,
                available: self.remaining,
            });
        }
        self.remaining -= amount;
        self.withdrawals += 1;
        Ok(self.remaining)
    }
}
