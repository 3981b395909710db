//! External collaborator contracts. The engine only ever holds in-memory
//! thread collections and opaque media references; storage, sync and blob
//! hosting live behind these traits.

use async_trait::async_trait;

use crate::error::Result;
use crate::models::{MediaKind, MediaRef, Thread};

/// Raw media payload handed to the engine alongside a submission, before it
/// has a hosted URL.
#[derive(Debug, Clone)]
pub struct MediaFile {
    pub name: String,
    pub kind: MediaKind,
    pub bytes: Vec<u8>,
}

/// Persistence/sync boundary. Implementations own durability, realtime
/// listeners and auth; the engine reads a snapshot and writes a whole
/// collection back.
#[async_trait]
pub trait ThreadStore: Send + Sync {
    async fn load(&self) -> Result<Vec<Thread>>;
    async fn save(&self, threads: &[Thread]) -> Result<()>;
}

/// Binary media boundary. `delete` is best-effort everywhere it is used:
/// failures are logged, never propagated.
#[async_trait]
pub trait MediaStore: Send + Sync {
    async fn upload(&self, file: MediaFile) -> Result<MediaRef>;
    async fn delete(&self, url: &str) -> Result<()>;
}
