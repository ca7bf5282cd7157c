//! Authentication: session persistence and login.
//!
//! This module provides:
//! - `SessionStore`: the JSON session record in the home directory
//! - `Authenticator`: picks a session from an explicit token, the store,
//!   or an interactive login
//! - `Credentials`: in-memory login details
//!
//! A session is trusted until the platform rejects it; there is no expiry.

pub mod authenticator;
pub mod credentials;
pub mod session;

pub use authenticator::{AuthArgs, Authenticator, CredentialPrompt, PromptChoice};
pub use credentials::Credentials;
pub use session::{SessionData, SessionStore};
