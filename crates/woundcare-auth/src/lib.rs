//! # woundcare-auth
//!
//! Authentication callback handling for the Woundcare patient portal.
//!
//! This crate provides:
//! - A client for the external identity service (authorization code exchange
//!   and user lookup)
//! - A read-only client for the profile store (privacy agreement flag)
//! - The post-login routing decision (`Role` × privacy agreement → path)
//! - The axum handler for `GET /auth/callback`
//!
//! ## Modules
//!
//! - [`config`] - Identity service configuration
//! - [`identity`] - Identity service trait, session and user types, HTTP client
//! - [`profile`] - Profile store trait and HTTP client
//! - [`role`] - Closed user role model
//! - [`redirect`] - Redirect targets and the routing decision
//! - [`cookie`] - Session and PKCE verifier cookies
//! - [`callback`] - Callback resolution and HTTP handler
//! - [`error`] - Callback and configuration error types

pub mod callback;
pub mod config;
pub mod cookie;
pub mod error;
pub mod identity;
pub mod profile;
pub mod redirect;
pub mod role;

pub use callback::{
    CallbackOutcome, CallbackParams, CallbackServices, CallbackState, callback_handler,
    resolve_callback,
};
pub use config::{IdentityConfig, IdentityCredentials};
pub use error::{CallbackError, ConfigError};
pub use identity::{IdentityError, IdentityService, Session, SupabaseAuthClient, User};
pub use profile::{Profile, ProfileError, ProfileStore, SupabaseProfileStore};
pub use redirect::{LoginErrorKind, RedirectTarget, decide};
pub use role::Role;
