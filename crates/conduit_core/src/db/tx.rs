//! Transaction coordinator and caller cancellation.
//!
//! # Responsibility
//! - Run every public data-access operation inside exactly one transaction.
//! - Commit only when the whole body succeeded; roll back otherwise.
//! - Abort in-flight statements when the caller cancels.
//!
//! # Invariants
//! - Nested steps of one operation share the same [`TxScope`]; they never open
//!   a second transaction.
//! - Cancellation is checked before every statement and before commit.
//! - A connection's interrupt handle is registered with the token only while
//!   that connection runs the operation.

use super::Database;
use crate::repo::{RepoError, RepoResult};
use log::{debug, error, info, warn};
use rusqlite::{InterruptHandle, OptionalExtension, Params, Row, Transaction, TransactionBehavior};
use std::fmt::{Debug, Formatter};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Instant;

/// Caller-owned cancellation signal.
///
/// Clones share state: cancelling any clone cancels them all. A token is meant
/// to follow one request; operations using it run one after another.
#[derive(Clone, Default)]
pub struct CancelToken {
    state: Arc<CancelState>,
}

#[derive(Default)]
struct CancelState {
    cancelled: AtomicBool,
    interrupt: Mutex<Option<InterruptHandle>>,
}

impl CancelState {
    fn slot(&self) -> MutexGuard<'_, Option<InterruptHandle>> {
        self.interrupt.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// Marks the token cancelled and interrupts the statement currently
    /// running on its behalf, if any.
    pub fn cancel(&self) {
        self.state.cancelled.store(true, Ordering::SeqCst);
        if let Some(handle) = self.state.slot().as_ref() {
            handle.interrupt();
        }
    }

    pub fn is_cancelled(&self) -> bool {
        self.state.cancelled.load(Ordering::SeqCst)
    }

    fn check(&self) -> RepoResult<()> {
        if self.is_cancelled() {
            Err(RepoError::Cancelled)
        } else {
            Ok(())
        }
    }

    fn attach(&self, handle: InterruptHandle) -> InterruptRegistration<'_> {
        *self.state.slot() = Some(handle);
        InterruptRegistration { token: self }
    }
}

impl Debug for CancelToken {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CancelToken")
            .field("cancelled", &self.is_cancelled())
            .finish()
    }
}

struct InterruptRegistration<'a> {
    token: &'a CancelToken,
}

impl Drop for InterruptRegistration<'_> {
    fn drop(&mut self) {
        *self.token.state.slot() = None;
    }
}

/// One open transaction plus the cancellation signal of its caller.
///
/// All statements of an operation go through this scope.
pub struct TxScope<'a> {
    tx: Transaction<'a>,
    cancel: &'a CancelToken,
    op: &'static str,
}

impl TxScope<'_> {
    /// Name of the public operation this transaction serves.
    pub fn op(&self) -> &'static str {
        self.op
    }

    /// Fails with [`RepoError::Cancelled`] once the caller has cancelled.
    pub fn checkpoint(&self) -> RepoResult<()> {
        self.cancel.check()
    }

    pub fn execute<P: Params>(&self, sql: &str, params: P) -> RepoResult<usize> {
        self.checkpoint()?;
        Ok(self.tx.execute(sql, params)?)
    }

    pub fn query_row<T, P, F>(&self, sql: &str, params: P, map: F) -> RepoResult<T>
    where
        P: Params,
        F: FnOnce(&Row<'_>) -> rusqlite::Result<T>,
    {
        self.checkpoint()?;
        Ok(self.tx.query_row(sql, params, map)?)
    }

    /// Like [`TxScope::query_row`], but zero rows yield `None`.
    pub fn query_opt<T, P, F>(&self, sql: &str, params: P, map: F) -> RepoResult<Option<T>>
    where
        P: Params,
        F: FnOnce(&Row<'_>) -> rusqlite::Result<T>,
    {
        self.checkpoint()?;
        Ok(self.tx.query_row(sql, params, map).optional()?)
    }

    /// Runs a query and collects every mapped row.
    pub fn query_all<T, P, F>(&self, sql: &str, params: P, map: F) -> RepoResult<Vec<T>>
    where
        P: Params,
        F: FnMut(&Row<'_>) -> rusqlite::Result<T>,
    {
        self.checkpoint()?;
        let mut stmt = self.tx.prepare(sql)?;
        let rows = stmt.query_map(params, map)?;
        Ok(rows.collect::<rusqlite::Result<Vec<T>>>()?)
    }

    fn commit(self) -> RepoResult<()> {
        self.checkpoint()?;
        self.tx.commit()?;
        Ok(())
    }
}

#[derive(Debug, Clone, Copy)]
enum TxMode {
    Read,
    Write,
}

impl TxMode {
    fn behavior(self) -> TransactionBehavior {
        match self {
            Self::Read => TransactionBehavior::Deferred,
            Self::Write => TransactionBehavior::Immediate,
        }
    }

    fn label(self) -> &'static str {
        match self {
            Self::Read => "read",
            Self::Write => "write",
        }
    }
}

impl Database {
    /// Runs `body` inside a deferred (read) transaction.
    pub fn read<T, F>(&self, cancel: &CancelToken, op: &'static str, body: F) -> RepoResult<T>
    where
        F: FnOnce(&TxScope<'_>) -> RepoResult<T>,
    {
        self.run(cancel, op, TxMode::Read, body)
    }

    /// Runs `body` inside an immediate (write) transaction.
    pub fn write<T, F>(&self, cancel: &CancelToken, op: &'static str, body: F) -> RepoResult<T>
    where
        F: FnOnce(&TxScope<'_>) -> RepoResult<T>,
    {
        self.run(cancel, op, TxMode::Write, body)
    }

    fn run<T, F>(&self, cancel: &CancelToken, op: &'static str, mode: TxMode, body: F) -> RepoResult<T>
    where
        F: FnOnce(&TxScope<'_>) -> RepoResult<T>,
    {
        let started_at = Instant::now();
        let result = self.run_in_tx(cancel, op, mode, body);
        let duration_ms = started_at.elapsed().as_millis();
        let mode = mode.label();

        match &result {
            Ok(_) => debug!("event=tx module=repo status=ok op={op} mode={mode} duration_ms={duration_ms}"),
            Err(RepoError::Cancelled) => warn!(
                "event=tx module=repo status=cancelled op={op} mode={mode} duration_ms={duration_ms}"
            ),
            Err(err) if err.is_client_error() => info!(
                "event=tx module=repo status=rejected op={op} mode={mode} duration_ms={duration_ms} error_code={}",
                err.code()
            ),
            Err(err) => error!(
                "event=tx module=repo status=error op={op} mode={mode} duration_ms={duration_ms} error_code={} error={err}",
                err.code()
            ),
        }

        result
    }

    fn run_in_tx<T, F>(&self, cancel: &CancelToken, op: &'static str, mode: TxMode, body: F) -> RepoResult<T>
    where
        F: FnOnce(&TxScope<'_>) -> RepoResult<T>,
    {
        cancel.check()?;
        let mut conn = self.pool.get()?;
        let _registration = cancel.attach(conn.get_interrupt_handle());

        let tx = conn.transaction_with_behavior(mode.behavior())?;
        let scope = TxScope { tx, cancel, op };
        // Dropping an uncommitted scope rolls the transaction back.
        let value = body(&scope)?;
        scope.commit()?;
        Ok(value)
    }
}
