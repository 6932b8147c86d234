//! Jira implementation of the tracker client.
//!
//! Issues are read from the REST endpoint `{base}{api_path}/issue/{key}` using basic auth.

use std::{sync::Arc, time::Duration};

use async_trait::async_trait;
use reqwest::StatusCode;
use serde::Deserialize;
use tracing::{debug, instrument};

use crate::base::{
    config::Config,
    error::LookupError,
    types::{IssueIdentifier, IssueRecord, Res},
};

use super::{GenericTrackerClient, TrackerClient};

/// Only the fields the reply needs.
const ISSUE_FIELDS: &str = "summary,status,assignee,reporter";

// Extra methods on `TrackerClient` applied by the jira implementation.

impl TrackerClient {
    /// Creates a new Jira tracker client.
    pub fn jira(config: &Config) -> Res<Self> {
        let client = JiraTrackerClient::new(config)?;
        Ok(Self { inner: Arc::new(client) })
    }
}

// Wire types.

#[derive(Debug, Deserialize)]
struct JiraIssue {
    key: String,
    fields: JiraIssueFields,
}

#[derive(Debug, Deserialize)]
struct JiraIssueFields {
    summary: String,
    status: JiraStatus,
    assignee: Option<JiraUser>,
    reporter: Option<JiraUser>,
}

#[derive(Debug, Deserialize)]
struct JiraStatus {
    name: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct JiraUser {
    display_name: String,
}

impl From<JiraIssue> for IssueRecord {
    fn from(issue: JiraIssue) -> Self {
        IssueRecord {
            key: IssueIdentifier::new(issue.key),
            summary: issue.fields.summary,
            status_name: issue.fields.status.name,
            assignee_display_name: issue.fields.assignee.map(|u| u.display_name),
            reporter_display_name: issue.fields.reporter.map(|u| u.display_name),
        }
    }
}

// Specific implementations.

/// Jira tracker client implementation.
#[derive(Clone)]
pub struct JiraTrackerClient {
    http: reqwest::Client,
    issue_url: String,
    username: String,
    password: String,
}

impl JiraTrackerClient {
    /// Create a new Jira tracker client.
    #[instrument(name = "JiraTrackerClient::new", skip_all)]
    pub fn new(config: &Config) -> Res<Self> {
        let http = reqwest::Client::builder().timeout(Duration::from_secs(config.jira_timeout_secs)).build()?;

        Ok(Self::with_http(config, http))
    }

    /// Create a Jira tracker client on top of an existing HTTP client.
    pub fn with_http(config: &Config, http: reqwest::Client) -> Self {
        Self {
            http,
            issue_url: format!("{}{}/issue", config.jira_base_url, config.jira_api_path),
            username: config.jira_username.clone(),
            password: config.jira_password.clone(),
        }
    }
}

#[async_trait]
impl GenericTrackerClient for JiraTrackerClient {
    #[instrument(skip(self, id), fields(issue = %id))]
    async fn fetch_issue(&self, id: &IssueIdentifier) -> Result<IssueRecord, LookupError> {
        let response = self
            .http
            .get(format!("{}/{}", self.issue_url, id))
            .basic_auth(&self.username, Some(&self.password))
            .query(&[("fields", ISSUE_FIELDS)])
            .send()
            .await
            .map_err(LookupError::Transport)?;

        check_status(id, response.status())?;

        let body = response.text().await.map_err(LookupError::Transport)?;
        let issue = decode_issue(&body)?;

        debug!("Fetched issue: {:?}", issue);

        Ok(issue)
    }
}

// Helpers.

/// Maps a non-success response status onto the lookup error it stands for.
fn check_status(id: &IssueIdentifier, status: StatusCode) -> Result<(), LookupError> {
    match status {
        s if s.is_success() => Ok(()),
        StatusCode::NOT_FOUND => Err(LookupError::NotFound(id.clone())),
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Err(LookupError::Unauthorized { status: status.as_u16() }),
        _ => Err(LookupError::Status { status: status.as_u16() }),
    }
}

/// Decodes a Jira issue body.
fn decode_issue(body: &str) -> Result<IssueRecord, LookupError> {
    serde_json::from_str::<JiraIssue>(body)
        .map(IssueRecord::from)
        .map_err(|e| LookupError::Malformed(e.to_string()))
}

// Tests.
