//! Mutation sinks: where a tick's merged batch is committed.
//!
//! A sink receives one [`MutationBatch`] per tick and must apply it as a
//! single atomic update: either every mutation lands or none does.

use tracing::debug;

use warband_types::{MutationBatch, PathWrite};

/// Errors raised while committing a batch.
#[derive(Debug, thiserror::Error)]
pub enum CommitError {
    /// A mutation could not be rendered as a store value.
    #[error("failed to render mutation: {source}")]
    Render {
        /// The underlying serialization error.
        #[from]
        source: serde_json::Error,
    },

    /// The backing store refused the update.
    #[error("store rejected commit: {reason}")]
    Rejected {
        /// Why the store refused.
        reason: String,
    },
}

/// Destination of committed mutations.
pub trait MutationSink {
    /// Apply `batch` atomically.
    fn commit(&mut self, batch: MutationBatch) -> Result<(), CommitError>;
}

/// A sink that renders each batch as path writes and keeps them, in
/// commit order. Stands in for a path-addressed realtime store.
#[derive(Debug, Clone)]
pub struct PathWriteRecorder {
    world_id: String,
    commits: Vec<Vec<PathWrite>>,
}

impl PathWriteRecorder {
    /// A recorder writing under `worlds/{world_id}`.
    pub fn new(world_id: impl Into<String>) -> Self {
        Self {
            world_id: world_id.into(),
            commits: Vec::new(),
        }
    }

    /// Every committed update, oldest first.
    pub fn commits(&self) -> &[Vec<PathWrite>] {
        &self.commits
    }

    /// The most recent update.
    pub fn last(&self) -> Option<&[PathWrite]> {
        self.commits.last().map(Vec::as_slice)
    }
}

impl MutationSink for PathWriteRecorder {
    fn commit(&mut self, batch: MutationBatch) -> Result<(), CommitError> {
        // Render everything before recording so a failure leaves no trace.
        let writes = batch.to_path_writes(&self.world_id)?;
        debug!(world_id = %self.world_id, writes = writes.len(), "Batch recorded");
        self.commits.push(writes);
        Ok(())
    }
}
