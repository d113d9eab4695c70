//! Session state for the Bharti backend.
//!
//! A session is a logical conversation thread identified by a numeric id and
//! holding an ordered, append-only list of turns. Sessions live in memory for
//! the process lifetime; the store tracks which id is currently "active" and
//! rotates it when memory is cleared.

pub mod session;
pub mod store;

pub use session::{Session, SessionId};
pub use store::{InMemorySessionStore, SessionStore};
