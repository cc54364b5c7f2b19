//! Transaction context for dictionary operations

use crate::engine::{EngineEnv, EngineTxn};
use crate::errors::{EngineResultExt, StoreResult};
use crate::observability::{Event, Logger};

/// The caller's transaction state
pub trait TxnContext {
    type Txn: EngineTxn;

    /// The active transaction, if any
    fn txn(&self) -> Option<&Self::Txn>;

    fn has_txn(&self) -> bool {
        self.txn().is_some()
    }

    fn is_read_only(&self) -> bool {
        self.txn().map(EngineTxn::is_read_only).unwrap_or(false)
    }
}

/// A client session holding at most one engine transaction
pub struct Session<T: EngineTxn> {
    txn: Option<T>,
}

impl<T: EngineTxn> Session<T> {
    /// No active transaction
    pub fn new() -> Self {
        Self { txn: None }
    }

    pub fn with_txn(txn: T) -> Self {
        Self { txn: Some(txn) }
    }

    /// Begin a top-level transaction
    pub fn begin<V: EngineEnv<Txn = T>>(env: &V, read_only: bool) -> StoreResult<Self> {
        let txn = env.begin_txn(None, read_only).or_classify()?;
        Ok(Self::with_txn(txn))
    }

    pub fn commit(mut self) -> StoreResult<()> {
        match self.txn.take() {
            Some(txn) => txn.commit().or_classify(),
            None => Ok(()),
        }
    }

    pub fn abort(mut self) -> StoreResult<()> {
        match self.txn.take() {
            Some(txn) => txn.abort().or_classify(),
            None => Ok(()),
        }
    }
}

impl<T: EngineTxn> Default for Session<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: EngineTxn> TxnContext for Session<T> {
    type Txn = T;

    fn txn(&self) -> Option<&T> {
        self.txn.as_ref()
    }
}

/// A top-level transaction used in place of the caller's.
///
/// Committed by [`EphemeralTxn::commit`]; aborted if dropped first, on
/// every exit path.
pub struct EphemeralTxn<T: EngineTxn> {
    txn: Option<T>,
}

impl<T: EngineTxn> EphemeralTxn<T> {
    pub fn begin<V: EngineEnv<Txn = T>>(env: &V) -> StoreResult<Self> {
        let txn = env.begin_txn(None, true).or_classify()?;
        Ok(Self { txn: Some(txn) })
    }

    pub fn txn(&self) -> Option<&T> {
        self.txn.as_ref()
    }

    pub fn commit(mut self) -> StoreResult<()> {
        match self.txn.take() {
            Some(txn) => txn.commit().or_classify(),
            None => Ok(()),
        }
    }
}

impl<T: EngineTxn> Drop for EphemeralTxn<T> {
    fn drop(&mut self) {
        if let Some(txn) = self.txn.take() {
            let id = txn.id().to_string();
            if let Err(status) = txn.abort() {
                let status = status.to_string();
                Logger::error(
                    Event::EngineDiagnostic.as_str(),
                    &[
                        ("reason", "ephemeral transaction abort failed"),
                        ("status", status.as_str()),
                        ("txn", id.as_str()),
                    ],
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::{Engine, EngineEnv, MemoryEngine, OpenFlags};
    use tempfile::TempDir;

    #[test]
    fn test_ephemeral_txn_aborts_on_drop() {
        let dir = TempDir::new().unwrap();
        let mut engine = MemoryEngine::new();
        let mut env = engine.create_env().unwrap().env;
        env.open(dir.path(), OpenFlags::transactional(), 0o755).unwrap();

        {
            let guard = EphemeralTxn::begin(&env).unwrap();
            assert!(guard.txn().is_some());
        }
        assert_eq!(engine.txn_stats().aborted, 1);

        let guard = EphemeralTxn::begin(&env).unwrap();
        guard.commit().unwrap();
        let stats = engine.txn_stats();
        assert_eq!((stats.committed, stats.aborted, stats.active()), (1, 1, 0));
    }

    #[test]
    fn test_session_context() {
        let dir = TempDir::new().unwrap();
        let mut engine = MemoryEngine::new();
        let mut env = engine.create_env().unwrap().env;
        env.open(dir.path(), OpenFlags::transactional(), 0o755).unwrap();

        let none: Session<crate::engine::memory::MemoryTxn> = Session::new();
        assert!(!none.has_txn());
        assert!(!none.is_read_only());

        let read_only = Session::begin(&env, true).unwrap();
        assert!(read_only.has_txn());
        assert!(read_only.is_read_only());
        read_only.commit().unwrap();

        let write = Session::begin(&env, false).unwrap();
        assert!(!write.is_read_only());
        write.abort().unwrap();
    }
}
