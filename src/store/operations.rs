//! Registry of in-flight remote calls.

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use crate::models::NoteId;

/// Identifier of one in-flight remote call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OperationId(Uuid);

impl OperationId {
    fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for OperationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// What a remote call is doing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind", content = "id")]
pub enum OperationKind {
    Fetch,
    Create,
    Delete(NoteId),
}

/// A remote call that has been issued and not yet resolved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingOperation {
    pub id: OperationId,
    pub kind: OperationKind,
}

#[derive(Debug, Default)]
pub(crate) struct Operations {
    pending: HashMap<OperationId, (OperationKind, CancellationToken)>,
}

impl Operations {
    pub(crate) fn register(&mut self, kind: OperationKind) -> (OperationId, CancellationToken) {
        let id = OperationId::new();
        let token = CancellationToken::new();
        self.pending.insert(id, (kind, token.clone()));
        (id, token)
    }

    /// Retire a call. Returns false if it was cancelled first.
    pub(crate) fn finish(&mut self, id: OperationId) -> bool {
        self.pending.remove(&id).is_some()
    }

    pub(crate) fn cancel(&mut self, id: OperationId) -> bool {
        match self.pending.remove(&id) {
            Some((_, token)) => {
                token.cancel();
                true
            }
            None => false,
        }
    }

    pub(crate) fn cancel_all(&mut self) -> usize {
        let count = self.pending.len();
        for (_, (_, token)) in self.pending.drain() {
            token.cancel();
        }
        count
    }

    pub(crate) fn list(&self) -> Vec<PendingOperation> {
        self.pending
            .iter()
            .map(|(id, (kind, _))| PendingOperation {
                id: *id,
                kind: *kind,
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_register_then_finish_leaves_nothing_pending() {
        let mut ops = Operations::default();
        let (id, token) = ops.register(OperationKind::Fetch);
        assert_eq!(ops.list().len(), 1);
        assert!(ops.finish(id));
        assert!(ops.list().is_empty());
        assert!(!token.is_cancelled());
    }

    #[test]
    fn test_cancel_trips_only_that_token() {
        let mut ops = Operations::default();
        let (first, first_token) = ops.register(OperationKind::Create);
        let (_, second_token) = ops.register(OperationKind::Delete(4));

        assert!(ops.cancel(first));
        assert!(first_token.is_cancelled());
        assert!(!second_token.is_cancelled());
        assert!(!ops.cancel(first));
    }

    #[test]
    fn test_finish_after_cancel_reports_cancelled() {
        let mut ops = Operations::default();
        let (id, _) = ops.register(OperationKind::Create);
        assert!(ops.cancel(id));
        assert!(!ops.finish(id));
    }

    #[test]
    fn test_cancel_all_counts_pending() {
        let mut ops = Operations::default();
        let (_, a) = ops.register(OperationKind::Fetch);
        let (_, b) = ops.register(OperationKind::Create);
        assert_eq!(ops.cancel_all(), 2);
        assert!(a.is_cancelled() && b.is_cancelled());
        assert!(ops.list().is_empty());
    }
}
