//! Partitioning of candidate models into primary and secondary buckets.

use answerline_core::model::{ModelHandle, ModelRole};
use tracing::debug;

/// The two model buckets the orchestrator chooses between.
#[derive(Debug, Clone, Default)]
pub struct ModelSet {
    primary: Option<ModelHandle>,
    secondary: Option<ModelHandle>,
}

impl ModelSet {
    /// Sort handles by [`ModelHandle::role`]: the explicit tag when present,
    /// else the `gpt` substring rule. A later handle replaces an earlier one in
    /// the same bucket.
    pub fn partition(handles: impl IntoIterator<Item = ModelHandle>) -> Self {
        let mut set = Self::default();
        for handle in handles {
            let role = handle.role();
            debug!(model = %handle.model_id(), role = %role, "Classified model");
            match role {
                ModelRole::Primary => set.primary = Some(handle),
                ModelRole::Secondary => set.secondary = Some(handle),
            }
        }
        set
    }

    pub fn primary(&self) -> Option<&ModelHandle> {
        self.primary.as_ref()
    }

    pub fn secondary(&self) -> Option<&ModelHandle> {
        self.secondary.as_ref()
    }

    pub fn get(&self, role: ModelRole) -> Option<&ModelHandle> {
        match role {
            ModelRole::Primary => self.primary(),
            ModelRole::Secondary => self.secondary(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.primary.is_none() && self.secondary.is_none()
    }
}
