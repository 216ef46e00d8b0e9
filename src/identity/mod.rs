//! Anonymous identity lifecycle: creation, loading and migration of the
//! persisted `UserIdentity`, optional account linking, and best-effort
//! mirroring of link state to a remote profile store.

mod manager;
mod profile;
pub mod validation;


pub use manager::{DebugInfo, IdentityManager, ReconcileOutcome, SessionPhase};
pub use profile::{LinkedAccount, UserIdentity, UserStats};
