use log::info;

use crate::error::{Error, Result};
use crate::gerrit::GerritApi;
use crate::prompt::Confirmation;

/// Gerrit asks for confirmation before expanding a large group into reviewers.
const GROUP_CONFIRMATION: &str = "Do you want to add them all as reviewers?";

#[derive(Debug, Default, PartialEq, Eq)]
pub struct ReviewerReport {
    /// (change, reviewer)
    pub added: Vec<(String, String)>,
    /// (change, reviewer, error message)
    pub failed: Vec<(String, String, String)>,
}

pub fn parse_reviewers(list: &str) -> Result<Vec<String>> {
    let reviewers: Vec<String> = list
        .split(',')
        .map(str::trim)
        .filter(|r| !r.is_empty())
        .map(str::to_string)
        .collect();

    if reviewers.is_empty() {
        return Err(Error::Usage("No reviewers given".to_string()));
    }
    Ok(reviewers)
}

/// Add every reviewer to every change; failures are reported, never fatal.
pub async fn handle_add_reviewers(
    api: &dyn GerritApi,
    prompt: &mut dyn Confirmation,
    changes: &[String],
    reviewers: &[String],
) -> Result<ReviewerReport> {
    println!();
    if !prompt.confirm("About to add reviewers to the preceding changes. You good with this?")? {
        return Err(Error::Cancelled);
    }

    let mut report = ReviewerReport::default();

    for change in changes {
        for reviewer in reviewers {
            match add_reviewer(api, change, reviewer).await {
                Ok(()) => {
                    println!("Successfully added {} to {}", reviewer, change);
                    report.added.push((change.clone(), reviewer.clone()));
                }
                Err(e) => {
                    let detail = e.detail();
                    eprintln!("Failed to add reviewer {} to change {} with error: {}", reviewer, change, detail);
                    report.failed.push((change.clone(), reviewer.clone(), detail));
                }
            }
        }
    }

    Ok(report)
}

async fn add_reviewer(api: &dyn GerritApi, change: &str, reviewer: &str) -> Result<()> {
    let mut response = api.add_reviewer(change, reviewer, false).await?;

    if response.is_success() && response.body.contains(GROUP_CONFIRMATION) {
        info!("Confirming group {} for {}", reviewer, change);
        response = api.add_reviewer(change, reviewer, true).await?;
    }

    if !response.is_success() {
        return Err(Error::unexpected_status("add reviewer to", change, response.status, &response.body));
    }
    Ok(())
}
