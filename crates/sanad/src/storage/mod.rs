//! Data-access layer for projects, milestones, and dependency edges.
//!
//! The dependency manager never touches storage directly. It opens a
//! [`StoreTransaction`] through a [`MilestoneStore`], performs its reads and
//! writes, and commits. Dropping a transaction without committing discards
//! every write made through it.
//!
//! Two backends are provided:
//!
//! - **In-memory**: `HashMap`s plus a `petgraph` adjacency index
//! - **JSONL**: the in-memory backend, loaded from and saved to a JSON Lines file
//!
//! # Example
//!
//! ```no_run
//! use sanad::storage::{StorageBackend, create_store};
//! use sanad::domain::{NewProject, UserId};
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> anyhow::Result<()> {
//!     let store = create_store(StorageBackend::InMemory).await?;
//!
//!     let mut tx = store.begin().await?;
//!     let project = tx
//!         .create_project(NewProject {
//!             name: "Solar Desalination".to_string(),
//!             founder_id: UserId::new("amal"),
//!             team_lead_id: None,
//!             core_team_member_ids: vec![],
//!         })
//!         .await?;
//!     tx.commit().await?;
//!
//!     println!("Created project: {}", project.id);
//!     Ok(())
//! }
//! ```

use crate::domain::{
    DependencyId, Milestone, MilestoneDependency, MilestoneId, MilestoneStatus, NewDependency,
    NewMilestone, NewProject, Project, ProjectId, UserId,
};
use crate::error::Result;
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::sync::Arc;

pub mod in_memory;

use in_memory::{InMemoryStore, LoadWarning};

/// Entry point to a storage backend.
///
/// # Thread Safety
///
/// Implementations must serialize transactions: while one transaction is
/// open, no other transaction may observe or change the data it reads. This
/// is what makes the manager's check-then-insert sequence race free.
#[async_trait]
pub trait MilestoneStore: Send + Sync {
    /// Open a transaction.
    ///
    /// Waits until any other open transaction has finished.
    async fn begin(&self) -> Result<Box<dyn StoreTransaction>>;

    /// Flush committed state to persistent storage.
    ///
    /// A no-op for purely in-memory backends.
    async fn save(&self) -> Result<()>;
}

/// A unit of work against the store.
///
/// Reads see the writes made earlier in the same transaction. Nothing is
/// kept unless [`commit`](Self::commit) succeeds.
#[async_trait]
pub trait StoreTransaction: Send + Sync {
    // ========== Projects ==========

    /// Get a project by ID.
    async fn get_project(&self, id: &ProjectId) -> Result<Option<Project>>;

    /// Create a project, assigning its ID and creation timestamp.
    ///
    /// # Errors
    ///
    /// Returns `Error::Validation` if the name or founder is blank.
    async fn create_project(&mut self, project: NewProject) -> Result<Project>;

    // ========== Milestones ==========

    /// Get a milestone by ID.
    async fn get_milestone(&self, id: &MilestoneId) -> Result<Option<Milestone>>;

    /// Create a milestone in the `not_started` state.
    ///
    /// # Errors
    ///
    /// - `Error::ProjectNotFound` if the owning project doesn't exist
    /// - `Error::Validation` if the title is blank
    async fn create_milestone(&mut self, milestone: NewMilestone) -> Result<Milestone>;

    /// Overwrite a milestone's status and bump `updated_at`.
    ///
    /// # Errors
    ///
    /// Returns `Error::MilestoneNotFound` if the milestone doesn't exist.
    async fn set_milestone_status(
        &mut self,
        id: &MilestoneId,
        status: MilestoneStatus,
    ) -> Result<Milestone>;

    /// All milestones of a project, ordered by ID.
    async fn project_milestones(&self, project: &ProjectId) -> Result<Vec<Milestone>>;

    // ========== Dependencies ==========

    /// Get an edge by ID.
    async fn get_dependency(&self, id: &DependencyId) -> Result<Option<MilestoneDependency>>;

    /// Find the edge for an ordered (predecessor, successor) pair.
    async fn find_dependency(
        &self,
        predecessor: &MilestoneId,
        successor: &MilestoneId,
    ) -> Result<Option<MilestoneDependency>>;

    /// Edges whose successor is `successor`, oldest first.
    async fn dependencies_into(&self, successor: &MilestoneId) -> Result<Vec<MilestoneDependency>>;

    /// Edges whose predecessor is `predecessor`, oldest first.
    async fn dependencies_from(
        &self,
        predecessor: &MilestoneId,
    ) -> Result<Vec<MilestoneDependency>>;

    /// Persist a new `active` edge, assigning its ID and timestamps.
    ///
    /// Performs no duplicate or cycle checks; those belong to the caller.
    ///
    /// # Errors
    ///
    /// Returns `Error::MilestoneNotFound` if either endpoint doesn't exist.
    async fn insert_dependency(
        &mut self,
        dependency: NewDependency,
        created_by: &UserId,
    ) -> Result<MilestoneDependency>;

    /// Replace a stored edge with `dependency`.
    ///
    /// # Errors
    ///
    /// Returns `Error::DependencyNotFound` if no edge has this ID.
    async fn save_dependency(&mut self, dependency: &MilestoneDependency) -> Result<()>;

    /// Remove an edge, returning it.
    ///
    /// # Errors
    ///
    /// Returns `Error::DependencyNotFound` if no edge has this ID.
    async fn delete_dependency(&mut self, id: &DependencyId) -> Result<MilestoneDependency>;

    // ========== Lifecycle ==========

    /// Keep every write made through this transaction.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::TransactionClosed` if already committed.
    async fn commit(&mut self) -> Result<()>;
}

/// Storage backend configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StorageBackend {
    /// In-memory storage (ephemeral)
    InMemory,

    /// In-memory storage persisted to a JSONL file
    Jsonl(PathBuf),
}

impl StorageBackend {
    /// Returns the data file path for file-based backends.
    pub fn data_path(&self) -> Option<&Path> {
        match self {
            StorageBackend::Jsonl(path) => Some(path),
            StorageBackend::InMemory => None,
        }
    }
}

/// In-memory store whose `save()` writes a JSONL snapshot.
#[derive(Debug, Clone)]
pub struct JsonlBackedStore {
    inner: InMemoryStore,
    path: PathBuf,
}

impl JsonlBackedStore {
    /// Open the store at `path`, loading it if the file exists.
    ///
    /// A missing file yields an empty store (first run).
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read.
    pub async fn open(path: impl Into<PathBuf>) -> Result<(Self, Vec<LoadWarning>)> {
        let path = path.into();
        let (inner, warnings) = if tokio::fs::try_exists(&path).await? {
            in_memory::load_from_jsonl(&path).await?
        } else {
            (InMemoryStore::new(), Vec::new())
        };
        Ok((Self { inner, path }, warnings))
    }

    /// Path of the backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl MilestoneStore for JsonlBackedStore {
    async fn begin(&self) -> Result<Box<dyn StoreTransaction>> {
        self.inner.begin().await
    }

    async fn save(&self) -> Result<()> {
        in_memory::save_to_jsonl(&self.inner, &self.path).await
    }
}

/// Create a store for the given backend.
///
/// Load warnings from a JSONL file are logged and otherwise ignored; the
/// store is still usable.
///
/// # Errors
///
/// Returns `Error::Io` or `Error::Storage` if the data file exists but
/// cannot be read.
pub async fn create_store(backend: StorageBackend) -> Result<Arc<dyn MilestoneStore>> {
    match backend {
        StorageBackend::InMemory => Ok(in_memory::new_in_memory_store()),
        StorageBackend::Jsonl(path) => {
            let (store, warnings) = JsonlBackedStore::open(path).await?;
            for warning in &warnings {
                tracing::warn!(warning = %warning, "JSONL load warning");
            }
            Ok(Arc::new(store))
        }
    }
}
