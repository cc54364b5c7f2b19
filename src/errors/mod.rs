//! Error classification for the storage layer
//!
//! Engine calls fail with a signed [`EngineStatus`]. Two distinct mechanisms
//! handle them:
//!
//! - Catchable: [`classify`] / [`check`] / [`EngineResultExt::or_classify`]
//!   return a [`StoreError`] whose [`OutcomeKind`] tells the caller whether to
//!   retry the transaction, fix its input, or shut down.
//! - Forced-fatal: [`fatal::halt_on`] / [`EngineResultExt::or_halt`] log and
//!   terminate regardless of classification.
//!
//! Unknown negative statuses always classify as fatal, never as retryable.

mod classify;
mod codes;
pub mod fatal;
pub mod status;
mod store_error;

pub use classify::{check, classify, classify_open, EngineResultExt};
pub use codes::{ErrorCode, OutcomeKind, Severity};
pub use status::{EngineResult, EngineStatus};
pub use store_error::{StoreError, StoreResult};
