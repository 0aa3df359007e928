//! Credential pool for external API services
//!
//! Holds, per named service, an ordered list of API keys and their availability.
//! Callers ask the pool for the key to use right now and report keys that the
//! upstream rejected. Rejected keys sit out a fixed cooldown and are brought back
//! lazily the next time the pool is asked.
//!
//! Key lifecycle:
//! 1. Keys are loaded once at startup from `PREFIX`, `PREFIX_1` .. `PREFIX_10`
//! 2. `get_key` returns the first eligible key in declaration order
//! 3. Upstream returns 401/429 → caller reports it via `mark_failed`
//! 4. Cooldown expires → the key is selectable again on the next `get_key`

pub mod classify;
pub mod loader;
pub mod pool;

pub use classify::{FailureClass, classify_status};
pub use loader::{MAX_NUMBERED_KEYS, ServiceKeys, collect_keys};
pub use pool::{CredentialPool, KeyStatus, SelectedKey};
