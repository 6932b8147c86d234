//! Renders ticket data into chat replies.

use crate::base::types::{IssueRecord, ReplyField, ReplyPayload};

/// Shown in the `Assigned` field for unassigned tickets.
const UNASSIGNED: &str = "Nobody";

/// Link to the ticket in the tracker's web UI.
pub fn browse_url(base_url: &str, issue: &IssueRecord) -> String {
    format!("{base_url}/browse/{}", issue.key)
}

/// Builds the reply for `issue`.
///
/// The text is a single line that reads well on its own; the fields carry the status and
/// assignee for transports that can render them.
pub fn format_reply(issue: &IssueRecord, base_url: &str) -> ReplyPayload {
    let url = browse_url(base_url, issue);

    let plain_text = match &issue.reporter_display_name {
        Some(reporter) => format!("*{}*: {} _Reported by {}_ - {}", issue.key, issue.summary, reporter, url),
        None => format!("*{}*: {} - {}", issue.key, issue.summary, url),
    };

    let assignee = issue.assignee_display_name.as_deref().unwrap_or(UNASSIGNED);

    ReplyPayload {
        plain_text,
        fields: vec![ReplyField::new("Status", &issue.status_name, true), ReplyField::new("Assigned", assignee, true)],
    }
}
