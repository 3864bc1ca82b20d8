//! Router Module Index
//!
//! Splits the HTTP surface by access level so the auth layer is applied per
//! module rather than per handler.

/// Routes accessible to anonymous callers: health, validation and navigation.
/// Navigation still honours a bearer token when one is sent.
pub mod public;

/// Routes protected by the `SignedIn` extractor middleware.
pub mod authenticated;
