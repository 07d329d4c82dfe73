// ABOUTME: Transaction management with an RAII guard for multi-statement writes
// ABOUTME: Guarantees automatic rollback on drop so readers never see partial recipe writes
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

//! Transaction management with an RAII rollback guard
//!
//! Recipe create/update replace the ingredient-line and tag sets as one
//! atomic unit. The [`TransactionGuard`] wraps a `SQLx` transaction and
//! rolls back automatically when dropped without an explicit `commit()`,
//! so an error anywhere in the write path leaves the original rows intact.

use sqlx::{Database, Transaction};
use tracing::debug;

use crate::errors::{AppError, AppResult};

/// RAII guard for database transactions ensuring automatic rollback on drop
///
/// - Automatic rollback if the guard is dropped without calling `commit()`
/// - Type-safe commit that consumes the guard (prevents double-commit)
pub struct TransactionGuard<'c, DB: Database> {
    transaction: Option<Transaction<'c, DB>>,
}

impl<'c, DB: Database> TransactionGuard<'c, DB> {
    /// Create a new transaction guard from an existing `SQLx` transaction
    #[must_use]
    pub fn new(transaction: Transaction<'c, DB>) -> Self {
        debug!("TransactionGuard created - transaction will auto-rollback if not committed");
        Self {
            transaction: Some(transaction),
        }
    }

    /// Access the transaction as an executor for queries
    ///
    /// # Errors
    ///
    /// Returns an error if the transaction was already consumed.
    pub fn executor(&mut self) -> AppResult<&mut DB::Connection> {
        self.transaction
            .as_mut()
            .map(|tx| &mut **tx)
            .ok_or_else(|| AppError::internal("Transaction already consumed"))
    }

    /// Commit the transaction and consume the guard
    ///
    /// # Errors
    ///
    /// Returns an error if the transaction was already consumed or the
    /// database commit fails.
    pub async fn commit(mut self) -> AppResult<()> {
        match self.transaction.take() {
            Some(tx) => {
                tx.commit()
                    .await
                    .map_err(|e| AppError::database(format!("Transaction commit failed: {e}")))?;
                debug!("TransactionGuard committed successfully");
                Ok(())
            }
            None => Err(AppError::internal(
                "Transaction already consumed - cannot commit",
            )),
        }
    }
}

// Dropping an uncommitted sqlx Transaction rolls it back; the guard only
// exists to make that contract explicit at the call sites.
