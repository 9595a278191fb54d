//! Session state entity and traffic recordings.

use super::mock::MockDefinition;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// One captured request/response pair.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Recording {
    pub method: String,
    pub path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub query: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_body: Option<String>,
    pub status: u16,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response_body: Option<String>,
    /// RFC 3339 capture time.
    pub timestamp: String,
}

/// Mutable state of one mock session.
///
/// Owned exclusively by [`super::StateStore`]; handlers borrow it for the
/// duration of a single request. Always constructed fully initialized, so
/// no handler can observe a partially built session.
#[derive(Debug, Default)]
pub struct SessionState {
    /// Registered mock definitions by name.
    pub mocks: HashMap<String, MockDefinition>,
    /// Named string variables. Keys are unique by construction.
    pub variables: HashMap<String, String>,
    /// Captured traffic, append-only while `record` is set.
    pub recordings: Vec<Recording>,
    /// Record mode flag. Toggled only through the record handler; toggling
    /// never discards existing recordings.
    pub record: bool,
}

impl SessionState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Merge variable assignments. Existing keys are overwritten.
    pub fn set_variables(&mut self, assignments: HashMap<String, String>) {
        self.variables.extend(assignments);
    }

    /// Remove a variable. Removing an absent key is a no-op success;
    /// returns whether the key was present.
    pub fn delete_variable(&mut self, name: &str) -> bool {
        self.variables.remove(name).is_some()
    }

    /// Register or replace a mock definition.
    pub fn put_mock(&mut self, mock: MockDefinition) {
        self.mocks.insert(mock.name.clone(), mock);
    }

    /// Mock definitions in name order. Map iteration order is arbitrary;
    /// listing and request matching both want a stable order.
    pub fn mocks_sorted(&self) -> Vec<&MockDefinition> {
        let mut mocks: Vec<&MockDefinition> = self.mocks.values().collect();
        mocks.sort_by(|a, b| a.name.cmp(&b.name));
        mocks
    }

    /// Reset every mock to its default scenario, zero delay, echo off.
    pub fn reset_mocks_to_defaults(&mut self) {
        for mock in self.mocks.values_mut() {
            mock.scenario = None;
            mock.delay_ms = 0;
            mock.echo = false;
        }
    }

    pub fn append_recording(&mut self, recording: Recording) {
        self.recordings.push(recording);
    }

    pub fn clear_recordings(&mut self) {
        self.recordings.clear();
    }
}
