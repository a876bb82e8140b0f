use log::info;

use crate::error::{Error, Result};
use crate::gerrit::GerritApi;
use crate::labels::LabelVotes;
use crate::prompt::Confirmation;

/// Returned by Gerrit when the change already sits on its target branch tip.
const ALREADY_REBASED: &str = "Change is already";

#[derive(Debug, Default, PartialEq, Eq)]
pub struct SubmitReport {
    pub submitted: Vec<String>,
    /// (change, error message)
    pub failed: Vec<(String, String)>,
}

/// Rebase, vote and submit each change in turn.
///
/// Rebase and vote failures end the run; a failed submit is reported and the
/// next change is still attempted.
pub async fn handle_submit(
    api: &dyn GerritApi,
    prompt: &mut dyn Confirmation,
    changes: &[String],
    votes: &LabelVotes,
) -> Result<SubmitReport> {
    println!();
    if !prompt.confirm("About to submit the preceding changes. You good with this?")? {
        return Err(Error::Cancelled);
    }

    let mut report = SubmitReport::default();

    for change in changes {
        rebase_change(api, change).await?;
        apply_labels(api, change, votes).await?;

        match submit_change(api, change).await {
            Ok(()) => {
                println!("Submitted: {}!", change);
                report.submitted.push(change.clone());
            }
            Err(e) => {
                let detail = e.detail();
                eprintln!("Failed to submit {} with error: {}", change, detail);
                report.failed.push((change.clone(), detail));
            }
        }
    }

    if !report.failed.is_empty() {
        eprintln!(
            "\n{} of {} change(s) could not be submitted",
            report.failed.len(),
            changes.len()
        );
    }

    Ok(report)
}

async fn rebase_change(api: &dyn GerritApi, change: &str) -> Result<()> {
    let response = api.rebase(change).await?;
    if response.is_success() {
        return Ok(());
    }

    if response.status == 409 && response.body.contains(ALREADY_REBASED) {
        info!("{} needs no rebase: {}", change, response.body.trim_end());
        return Ok(());
    }

    Err(Error::unexpected_status("rebase", change, response.status, &response.body))
}

async fn apply_labels(api: &dyn GerritApi, change: &str, votes: &LabelVotes) -> Result<()> {
    let response = api.review(change, votes).await?;
    if !response.is_success() {
        return Err(Error::unexpected_status(
            "apply labels to change",
            change,
            response.status,
            &response.body,
        ));
    }
    Ok(())
}

async fn submit_change(api: &dyn GerritApi, change: &str) -> Result<()> {
    let response = api.submit(change).await?;
    if !response.is_success() {
        return Err(Error::unexpected_status("submit", change, response.status, &response.body));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gerrit::RestResponse;
    use crate::mock_gerrit::{MockCall, MockGerritClient};
    use crate::prompt::ScriptedConfirmation;

    fn votes() -> LabelVotes {
        LabelVotes::from_lists("Code-Review,Verified", "+2,+1").unwrap()
    }

    fn changes(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[tokio::test]
    async fn test_declined_prompt_sends_nothing() {
        let mock = MockGerritClient::new();
        let mut prompt = ScriptedConfirmation::new(false);

        let result = handle_submit(&mock, &mut prompt, &changes(&["10", "11"]), &votes()).await;

        assert!(matches!(result, Err(Error::Cancelled)));
        assert_eq!(prompt.asked, 1);
        assert_eq!(
            prompt.last_message.as_deref(),
            Some("About to submit the preceding changes. You good with this?")
        );
        assert!(mock.mutating_calls().is_empty());
    }

    #[tokio::test]
    async fn test_rebase_vote_submit_sequence() {
        let mock = MockGerritClient::new();
        let mut prompt = ScriptedConfirmation::new(true);

        let report = handle_submit(&mock, &mut prompt, &changes(&["7"]), &votes()).await.unwrap();

        assert_eq!(report.submitted, changes(&["7"]));
        assert_eq!(
            mock.mutating_calls(),
            vec![
                MockCall::Rebase("7".to_string()),
                MockCall::Review { change: "7".to_string(), votes: votes() },
                MockCall::Submit("7".to_string()),
            ]
        );
    }

    #[tokio::test]
    async fn test_already_rebased_conflict_continues() {
        let mock = MockGerritClient::new();
        mock.respond_rebase("7", RestResponse::new(409, "Change is already up to date.\n"));
        let mut prompt = ScriptedConfirmation::new(true);

        let report = handle_submit(&mock, &mut prompt, &changes(&["7"]), &votes()).await.unwrap();

        assert_eq!(report.submitted, changes(&["7"]));
        assert!(mock.mutating_calls().contains(&MockCall::Submit("7".to_string())));
    }

    #[tokio::test]
    async fn test_other_rebase_conflict_aborts() {
        let mock = MockGerritClient::new();
        mock.respond_rebase("7", RestResponse::new(409, "The change could not be rebased due to a conflict"));
        let mut prompt = ScriptedConfirmation::new(true);

        let err = handle_submit(&mock, &mut prompt, &changes(&["7", "8"]), &votes())
            .await
            .unwrap_err();

        assert!(err.to_string().contains("Failed to rebase 7"));
        assert_eq!(mock.mutating_calls(), vec![MockCall::Rebase("7".to_string())]);
    }

    #[tokio::test]
    async fn test_label_failure_aborts() {
        let mock = MockGerritClient::new();
        mock.respond_review("7", RestResponse::new(403, "Applying label \"Verified\": +1 is restricted"));
        let mut prompt = ScriptedConfirmation::new(true);

        let err = handle_submit(&mock, &mut prompt, &changes(&["7", "8"]), &votes())
            .await
            .unwrap_err();

        assert!(matches!(err, Error::UnexpectedStatus { status: 403, .. }));
        assert!(!mock.mutating_calls().contains(&MockCall::Submit("7".to_string())));
        assert!(!mock.mutating_calls().contains(&MockCall::Rebase("8".to_string())));
    }

    #[tokio::test]
    async fn test_submit_failure_does_not_stop_next_change() {
        let mock = MockGerritClient::new();
        mock.respond_submit("42", RestResponse::new(409, "Change 42: needs Verified"));
        let mut prompt = ScriptedConfirmation::new(true);

        let report = handle_submit(&mock, &mut prompt, &changes(&["42", "43"]), &votes())
            .await
            .unwrap();

        assert_eq!(report.submitted, changes(&["43"]));
        assert_eq!(report.failed.len(), 1);
        assert_eq!(report.failed[0].0, "42");
        assert_eq!(report.failed[0].1, "HTTP 409: Change 42: needs Verified");
        assert!(mock.mutating_calls().contains(&MockCall::Submit("43".to_string())));
    }
}
