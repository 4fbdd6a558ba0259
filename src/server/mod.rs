//! Server module for Journey
//!
//! # Module Structure
//!
//! - `config`: Configuration structures
//! - `loader`: Configuration loading from files and environment
//! - `validation`: Startup and production configuration checks
//! - `init_stores`: Relational and object store construction
//! - `init`: Router assembly and the run loop

pub mod config;
mod init;
mod init_stores;
mod loader;
mod validation;

pub use init::run;
pub use init_stores::{build_object_store, open_store};
pub use loader::load_config;
