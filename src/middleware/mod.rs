//! Middleware module for the Journey HTTP server
//!
//! Provides request session extraction (Bearer token → identity service).

pub mod auth;
