pub mod reviewers;
pub mod status;
pub mod submit;

use crate::changes::{ChangeSelection, resolve_changes};
use crate::cli::Cli;
use crate::config::ServerProfile;
use crate::error::{Error, Result};
use crate::gerrit::{ChangeSummary, GerritApi};
use crate::prompt::Confirmation;

pub use reviewers::ReviewerReport;
pub use submit::SubmitReport;

/// What a completed run did
#[derive(Debug, PartialEq, Eq)]
pub enum Outcome {
    Status(Vec<ChangeSummary>),
    Submitted(SubmitReport),
    ReviewersAdded(ReviewerReport),
}

/// Resolve the changes, report their status, then run the requested workflow.
///
/// Everything that can be checked locally is checked before the first request.
pub async fn run(
    cli: &Cli,
    profile: &ServerProfile,
    api: &dyn GerritApi,
    prompt: &mut dyn Confirmation,
) -> Result<Outcome> {
    let selection = ChangeSelection::from_cli(cli);
    selection.validate()?;

    let reviewer_list = cli
        .add_reviewers
        .as_deref()
        .map(reviewers::parse_reviewers)
        .transpose()?;

    let votes = if cli.submit {
        Some(profile.labels.as_ref().ok_or_else(|| {
            Error::Config("Labels must be set to submit".to_string())
        })?)
    } else {
        None
    };

    let changes = resolve_changes(api, &selection).await?;
    let summaries = status::handle_status(api, &changes).await?;

    if let Some(votes) = votes {
        let report = submit::handle_submit(api, prompt, &changes, votes).await?;
        Ok(Outcome::Submitted(report))
    } else if let Some(reviewer_list) = reviewer_list {
        let report = reviewers::handle_add_reviewers(api, prompt, &changes, &reviewer_list).await?;
        Ok(Outcome::ReviewersAdded(report))
    } else {
        Ok(Outcome::Status(summaries))
    }
}
