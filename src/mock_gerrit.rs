use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use crate::error::{Error, Result};
use crate::gerrit::{ChangeSummary, GerritApi, RestResponse};
use crate::labels::LabelVotes;

/// A request the mock received, in order of arrival
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MockCall {
    QueryTopic { topic: String, open_only: bool },
    GetChange(String),
    Rebase(String),
    Review { change: String, votes: LabelVotes },
    Submit(String),
    AddReviewer { change: String, reviewer: String, confirmed: bool },
}

impl MockCall {
    pub fn is_mutating(&self) -> bool {
        !matches!(self, MockCall::QueryTopic { .. } | MockCall::GetChange(_))
    }
}

/// Mock Gerrit client for testing that serves canned data from memory
#[derive(Debug, Clone, Default)]
pub struct MockGerritClient {
    /// Known changes: (change id -> summary)
    changes: Arc<Mutex<HashMap<String, ChangeSummary>>>,
    /// Topic query results: (topic -> changes)
    topics: Arc<Mutex<HashMap<String, Vec<ChangeSummary>>>>,
    /// Canned responses for mutating calls, keyed by endpoint; 200 otherwise
    responses: Arc<Mutex<HashMap<String, RestResponse>>>,
    calls: Arc<Mutex<Vec<MockCall>>>,
}

impl MockGerritClient {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a NEW change whose subject is derived from its number
    pub fn add_change(&self, number: u64) -> &Self {
        self.add_change_with(number, "NEW", &format!("Change {}", number))
    }

    pub fn add_change_with(&self, number: u64, status: &str, subject: &str) -> &Self {
        let summary = ChangeSummary {
            status: status.to_string(),
            number,
            subject: subject.to_string(),
        };
        self.changes.lock().unwrap().insert(number.to_string(), summary);
        self
    }

    pub fn add_topic(&self, topic: &str, numbers: &[u64]) -> &Self {
        let changes = self.changes.lock().unwrap();
        let summaries = numbers
            .iter()
            .map(|number| {
                changes.get(&number.to_string()).cloned().unwrap_or_else(|| ChangeSummary {
                    status: "NEW".to_string(),
                    number: *number,
                    subject: format!("Change {}", number),
                })
            })
            .collect();
        self.topics.lock().unwrap().insert(topic.to_string(), summaries);
        self
    }

    pub fn respond_rebase(&self, change: &str, response: RestResponse) -> &Self {
        self.set_response(format!("rebase/{}", change), response)
    }

    pub fn respond_review(&self, change: &str, response: RestResponse) -> &Self {
        self.set_response(format!("review/{}", change), response)
    }

    pub fn respond_submit(&self, change: &str, response: RestResponse) -> &Self {
        self.set_response(format!("submit/{}", change), response)
    }

    pub fn respond_reviewer(&self, change: &str, reviewer: &str, confirmed: bool, response: RestResponse) -> &Self {
        self.set_response(reviewer_key(change, reviewer, confirmed), response)
    }

    fn set_response(&self, key: String, response: RestResponse) -> &Self {
        self.responses.lock().unwrap().insert(key, response);
        self
    }

    fn response_for(&self, key: &str) -> RestResponse {
        self.responses
            .lock()
            .unwrap()
            .get(key)
            .cloned()
            .unwrap_or_else(RestResponse::ok)
    }

    fn record(&self, call: MockCall) {
        self.calls.lock().unwrap().push(call);
    }

    /// Get every call received so far for testing verification
    pub fn calls(&self) -> Vec<MockCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn mutating_calls(&self) -> Vec<MockCall> {
        self.calls().into_iter().filter(MockCall::is_mutating).collect()
    }
}

fn reviewer_key(change: &str, reviewer: &str, confirmed: bool) -> String {
    format!("reviewers/{}/{}/{}", change, reviewer, confirmed)
}

#[async_trait]
impl GerritApi for MockGerritClient {
    async fn query_topic(&self, topic: &str, open_only: bool) -> Result<Vec<ChangeSummary>> {
        self.record(MockCall::QueryTopic {
            topic: topic.to_string(),
            open_only,
        });

        match self.topics.lock().unwrap().get(topic) {
            Some(changes) => Ok(changes.clone()),
            None => Err(Error::unexpected_status("fetch changes for topic", topic, 400, "unknown topic")),
        }
    }

    async fn get_change(&self, change: &str) -> Result<ChangeSummary> {
        self.record(MockCall::GetChange(change.to_string()));

        match self.changes.lock().unwrap().get(change) {
            Some(summary) => Ok(summary.clone()),
            None => Err(Error::unexpected_status("fetch change", change, 404, "Not found")),
        }
    }

    async fn rebase(&self, change: &str) -> Result<RestResponse> {
        self.record(MockCall::Rebase(change.to_string()));
        Ok(self.response_for(&format!("rebase/{}", change)))
    }

    async fn review(&self, change: &str, votes: &LabelVotes) -> Result<RestResponse> {
        self.record(MockCall::Review {
            change: change.to_string(),
            votes: votes.clone(),
        });
        Ok(self.response_for(&format!("review/{}", change)))
    }

    async fn submit(&self, change: &str) -> Result<RestResponse> {
        self.record(MockCall::Submit(change.to_string()));
        Ok(self.response_for(&format!("submit/{}", change)))
    }

    async fn add_reviewer(&self, change: &str, reviewer: &str, confirmed: bool) -> Result<RestResponse> {
        self.record(MockCall::AddReviewer {
            change: change.to_string(),
            reviewer: reviewer.to_string(),
            confirmed,
        });
        Ok(self.response_for(&reviewer_key(change, reviewer, confirmed)))
    }
}
