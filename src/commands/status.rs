use crate::error::Result;
use crate::gerrit::{ChangeSummary, GerritApi};

/// Fetch every change's summary, stopping at the first failure.
pub async fn fetch_summaries(api: &dyn GerritApi, changes: &[String]) -> Result<Vec<ChangeSummary>> {
    let mut summaries = Vec::with_capacity(changes.len());
    for change in changes {
        summaries.push(api.get_change(change).await?);
    }
    Ok(summaries)
}

pub async fn handle_status(api: &dyn GerritApi, changes: &[String]) -> Result<Vec<ChangeSummary>> {
    println!(
        "Fetching info about {} change{}...\n",
        changes.len(),
        if changes.len() == 1 { "" } else { "s" }
    );

    let summaries = fetch_summaries(api, changes).await?;
    for summary in &summaries {
        println!("{}", summary);
    }

    Ok(summaries)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::mock_gerrit::{MockCall, MockGerritClient};

    #[tokio::test]
    async fn test_fetch_summaries_in_order() {
        let mock = MockGerritClient::new();
        mock.add_change_with(7, "NEW", "Fix bug").add_change_with(8, "MERGED", "Add test");

        let summaries = handle_status(&mock, &["7".to_string(), "8".to_string()]).await.unwrap();
        let lines: Vec<String> = summaries.iter().map(ToString::to_string).collect();
        assert_eq!(lines, vec!["[NEW] [7] Fix bug", "[MERGED] [8] Add test"]);
    }

    #[tokio::test]
    async fn test_first_failure_stops_the_fetch() {
        let mock = MockGerritClient::new();
        mock.add_change(1).add_change(3);

        let changes = vec!["1".to_string(), "2".to_string(), "3".to_string()];
        let err = fetch_summaries(&mock, &changes).await.unwrap_err();

        assert!(matches!(err, Error::UnexpectedStatus { ref change, status: 404, .. } if change == "2"));
        assert_eq!(
            mock.calls(),
            vec![MockCall::GetChange("1".to_string()), MockCall::GetChange("2".to_string())]
        );
    }
}
