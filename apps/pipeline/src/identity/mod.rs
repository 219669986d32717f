//! Identity resolution: content fingerprinting, ID minting and the email-keyed identity store.

pub mod fingerprint;
pub mod ids;
pub mod resolver;
pub mod store;

pub use fingerprint::content_fingerprint;
pub use resolver::{IdentityResolver, Resolution, ResolutionAction};
pub use store::{IdentityStore, PgIdentityStore, StoreError, UpsertOutcome};
