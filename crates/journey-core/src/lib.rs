//! Journey Core - the memory record workflow
//!
//! Coordinates the relational store, the object store and the caller's
//! session for every create, update and delete of a memory:
//!
//! - [`MemoryWorkflow`]: ordered write steps and the timeline read
//! - [`SessionGate`]: who is asking, resolved once per write
//! - [`IdentityClient`]: bearer token lookup against the identity service

#![forbid(unsafe_code)]

pub mod error;
pub mod identity;
pub mod session;
pub mod workflow;

pub use error::{Result, WorkflowError};
pub use identity::{BearerSession, IdentityClient};
pub use session::{SessionError, SessionGate, StaticSession};
pub use workflow::{parse_date, MemoryDraft, MemoryPatchDraft, MemoryWorkflow, UploadFile};
