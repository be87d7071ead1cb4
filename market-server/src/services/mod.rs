//! Collaborator services
//!
//! The seams to everything the engine treats as external: object storage
//! for dispute evidence, the dispute orchestration that sequences uploads
//! before the transaction, and the best-effort notification fan-out.

pub mod disputes;
pub mod notify;
pub mod object_storage;

pub use disputes::{DisputeService, EvidenceFile};
pub use notify::Notifier;
pub use object_storage::{FsObjectStore, ObjectStorage, ObjectStorageError};
