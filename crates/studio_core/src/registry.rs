//! Session-scoped document registry: the last applied server snapshot plus any
//! optimistic uploads the server has not listed yet.
use std::collections::HashSet;

use crate::{DocumentId, DocumentRecord, DocumentStatus};

/// Client-generated key for one upload, from request to acknowledgment.
pub type UploadId = u64;

/// An acknowledged upload that no applied snapshot has listed yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingUpload {
    pub upload_id: UploadId,
    pub document_id: DocumentId,
    pub display_name: String,
    /// Sequence of the newest refresh tick issued when the upload was
    /// acknowledged. Snapshots from ticks after it are authoritative for this
    /// entry; snapshots at or before it may predate the upload.
    pub refresh_horizon: u64,
}

impl PendingUpload {
    pub fn to_record(&self) -> DocumentRecord {
        DocumentRecord::uploaded(self.document_id.clone(), self.display_name.clone())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegistryEntry {
    Confirmed(DocumentRecord),
    Pending(PendingUpload),
}

impl RegistryEntry {
    pub fn document_id(&self) -> &DocumentId {
        match self {
            RegistryEntry::Confirmed(record) => &record.id,
            RegistryEntry::Pending(pending) => &pending.document_id,
        }
    }

    pub fn status(&self) -> DocumentStatus {
        match self {
            RegistryEntry::Confirmed(record) => record.status,
            RegistryEntry::Pending(_) => DocumentStatus::Uploaded,
        }
    }

    pub fn display_name(&self) -> &str {
        match self {
            RegistryEntry::Confirmed(record) => &record.display_name,
            RegistryEntry::Pending(pending) => &pending.display_name,
        }
    }

    pub fn to_record(&self) -> DocumentRecord {
        match self {
            RegistryEntry::Confirmed(record) => record.clone(),
            RegistryEntry::Pending(pending) => pending.to_record(),
        }
    }

    pub fn is_pending(&self) -> bool {
        matches!(self, RegistryEntry::Pending(_))
    }
}

/// Outcome of offering a snapshot to the registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SnapshotOutcome {
    Applied {
        confirmed: usize,
        retained_pending: usize,
    },
    /// A snapshot from a newer tick was already applied.
    Stale,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DocumentRegistry {
    entries: Vec<RegistryEntry>,
    last_applied_refresh: Option<u64>,
    consecutive_failures: u32,
}

impl DocumentRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Entries in discovery order: the snapshot first, then retained pending uploads.
    pub fn entries(&self) -> &[RegistryEntry] {
        &self.entries
    }

    pub fn records(&self) -> Vec<DocumentRecord> {
        self.entries.iter().map(RegistryEntry::to_record).collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, id: &DocumentId) -> Option<&RegistryEntry> {
        self.entries.iter().rev().find(|entry| entry.document_id() == id)
    }

    pub fn contains(&self, id: &DocumentId) -> bool {
        self.get(id).is_some()
    }

    /// Confirmed records with status `PROCESSED`, in registry order.
    pub fn processed(&self) -> impl Iterator<Item = &DocumentRecord> {
        self.entries.iter().filter_map(|entry| match entry {
            RegistryEntry::Confirmed(record) if record.status == DocumentStatus::Processed => {
                Some(record)
            }
            _ => None,
        })
    }

    pub fn last_applied_refresh(&self) -> Option<u64> {
        self.last_applied_refresh
    }

    pub fn consecutive_failures(&self) -> u32 {
        self.consecutive_failures
    }

    /// Appends an optimistic `UPLOADED` entry for an acknowledged upload.
    ///
    /// Returns `false` when the document is already present, which happens when
    /// a snapshot listing it was applied before the acknowledgment arrived.
    pub fn record_optimistic_upload(&mut self, pending: PendingUpload) -> bool {
        if self.contains(&pending.document_id) {
            return false;
        }
        self.entries.push(RegistryEntry::Pending(pending));
        true
    }

    /// Replaces the registry with the snapshot taken by refresh tick `seq`.
    ///
    /// Confirmed entries are never merged with an older snapshot. Pending
    /// entries survive only while the snapshot omits them and was issued no
    /// later than the upload's refresh horizon.
    pub fn apply_snapshot(&mut self, seq: u64, snapshot: Vec<DocumentRecord>) -> SnapshotOutcome {
        if self.last_applied_refresh.is_some_and(|last| seq <= last) {
            return SnapshotOutcome::Stale;
        }

        let listed: HashSet<&DocumentId> = snapshot.iter().map(|record| &record.id).collect();
        let retained: Vec<RegistryEntry> = self
            .entries
            .iter()
            .filter(|entry| match entry {
                RegistryEntry::Pending(pending) => {
                    !listed.contains(&pending.document_id) && seq <= pending.refresh_horizon
                }
                RegistryEntry::Confirmed(_) => false,
            })
            .cloned()
            .collect();

        let confirmed = snapshot.len();
        let retained_pending = retained.len();
        let mut entries: Vec<RegistryEntry> =
            snapshot.into_iter().map(RegistryEntry::Confirmed).collect();
        entries.extend(retained);

        self.entries = entries;
        self.last_applied_refresh = Some(seq);
        self.consecutive_failures = 0;
        SnapshotOutcome::Applied {
            confirmed,
            retained_pending,
        }
    }

    /// Notes a failed refresh; the cached entries are kept as they are.
    pub fn record_refresh_failure(&mut self) {
        self.consecutive_failures = self.consecutive_failures.saturating_add(1);
    }
}
