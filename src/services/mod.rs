//! Side effects: backend calls, the cooldown ticker and the identity store.
pub mod auth_api;
pub mod identity;
pub mod session;
pub mod ticker;

pub use auth_api::{ApiAck, ApiError, AuthApi, AuthClient};
pub use identity::{IdentityProvider, JsonFileStore, KeyValueStore, MemoryStore, StaticIdentity, StoredIdentity};
pub use session::{Effect, SessionUpdate, UiEvent, VerificationSession};
pub use ticker::{Tick, Ticker};
