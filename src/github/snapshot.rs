//! Offline provider over captured snapshots

use super::{MetadataProvider, ProviderError, ProviderResult, RateLimit};
use crate::models::{
    BasicInfo, CommitRecord, ContributorRecord, IssueRecord, RawRepositorySnapshot,
    ReleaseRecord, RepositoryId,
};
use chrono::{DateTime, Utc};
use std::collections::{BTreeMap, HashMap};

/// Serves [`RawRepositorySnapshot`]s keyed by repository.
///
/// Filters by `since` the same way the API does, so a snapshot taken with a
/// wide window can be re-scored with a narrower one.
#[derive(Debug, Default)]
pub struct SnapshotProvider {
    snapshots: HashMap<RepositoryId, RawRepositorySnapshot>,
}

impl SnapshotProvider {
    pub fn new(snapshots: impl IntoIterator<Item = RawRepositorySnapshot>) -> Self {
        Self {
            snapshots: snapshots.into_iter().map(|s| (s.id.clone(), s)).collect(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    fn snapshot(&self, id: &RepositoryId) -> ProviderResult<&RawRepositorySnapshot> {
        self.snapshots.get(id).ok_or_else(|| ProviderError::Api {
            status: 404,
            message: format!("No snapshot for {}", id),
        })
    }
}

impl MetadataProvider for SnapshotProvider {
    fn basic_info(&self, id: &RepositoryId) -> ProviderResult<BasicInfo> {
        Ok(self.snapshot(id)?.basic.clone())
    }

    fn commits(&self, id: &RepositoryId, since: DateTime<Utc>) -> ProviderResult<Vec<CommitRecord>> {
        Ok(self
            .snapshot(id)?
            .commits
            .iter()
            .filter(|c| c.authored_at >= since)
            .cloned()
            .collect())
    }

    fn issues(&self, id: &RepositoryId, since: DateTime<Utc>) -> ProviderResult<Vec<IssueRecord>> {
        Ok(self
            .snapshot(id)?
            .issues
            .iter()
            .filter(|i| i.updated_at >= since)
            .cloned()
            .collect())
    }

    fn releases(&self, id: &RepositoryId) -> ProviderResult<Vec<ReleaseRecord>> {
        Ok(self.snapshot(id)?.releases.clone())
    }

    fn contributors(&self, id: &RepositoryId) -> ProviderResult<Vec<ContributorRecord>> {
        Ok(self.snapshot(id)?.contributors.clone())
    }

    fn file_paths(&self, id: &RepositoryId, _branch: &str) -> ProviderResult<Vec<String>> {
        Ok(self.snapshot(id)?.file_paths.clone())
    }

    fn languages(&self, id: &RepositoryId) -> ProviderResult<BTreeMap<String, u64>> {
        Ok(self.snapshot(id)?.languages.clone())
    }

    fn root_entries(&self, id: &RepositoryId) -> ProviderResult<Vec<String>> {
        Ok(self.snapshot(id)?.root_entries.clone())
    }

    fn file_content(&self, id: &RepositoryId, path: &str) -> ProviderResult<Option<String>> {
        Ok(self
            .snapshot(id)?
            .manifest
            .as_ref()
            .filter(|m| m.path == path)
            .map(|m| m.content.clone()))
    }

    fn rate_limit(&self) -> ProviderResult<Option<RateLimit>> {
        Ok(None)
    }
}
