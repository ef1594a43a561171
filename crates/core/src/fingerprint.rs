// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Fingerprint: the semantic key a job was started for.
//!
//! Two results belong to the same logical request only when their
//! fingerprints are equal, so the map is ordered and values are trimmed to
//! keep equality and the JSON encoding canonical.

use crate::kind::JobKind;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Fingerprint(BTreeMap<String, String>);

impl Fingerprint {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a field, trimming surrounding whitespace from the value.
    pub fn with(mut self, key: impl Into<String>, value: impl AsRef<str>) -> Self {
        self.0.insert(key.into(), value.as_ref().trim().to_string());
        self
    }

    /// `{repo_url, branch}` fingerprint for repository validation.
    pub fn repository(repo_url: impl AsRef<str>, branch: impl AsRef<str>) -> Self {
        Self::new().with("repo_url", repo_url).with("branch", branch)
    }

    /// `{project_id}` fingerprint for project-scoped jobs.
    pub fn project(project_id: impl AsRef<str>) -> Self {
        Self::new().with("project_id", project_id)
    }

    /// `{meeting_id}` fingerprint for meeting processing.
    pub fn meeting(meeting_id: impl AsRef<str>) -> Self {
        Self::new().with("meeting_id", meeting_id)
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Required fields of `kind` that are absent or blank.
    pub fn missing_fields(&self, kind: JobKind) -> Vec<String> {
        kind.required_fields()
            .iter()
            .filter(|field| self.get(field).map_or(true, str::is_empty))
            .map(|field| field.to_string())
            .collect()
    }
}

impl std::fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut first = true;
        for (k, v) in &self.0 {
            if !first {
                f.write_str(",")?;
            }
            write!(f, "{k}={v}")?;
            first = false;
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "fingerprint_tests.rs"]
mod tests;
