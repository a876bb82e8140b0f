use std::collections::HashSet;

use log::debug;

use crate::cli::Cli;
use crate::error::{Error, Result};
use crate::gerrit::GerritApi;

/// Largest number of changes a single `LOW-HIGH` token may expand to.
pub const MAX_RANGE_LEN: u64 = 10_000;

const NO_CHANGES: &str = "You must specify either a range of changes or a topic";

/// What the user asked to operate on, before any server lookup.
#[derive(Debug, Clone, Default)]
pub struct ChangeSelection {
    pub args: Vec<String>,
    pub topic: Option<String>,
    pub exclude: Option<String>,
    /// Restrict topic results to open changes
    pub open_only: bool,
}

impl ChangeSelection {
    pub fn from_cli(cli: &Cli) -> Self {
        Self {
            args: cli.changes.clone(),
            topic: cli.topic.clone().filter(|topic| !topic.trim().is_empty()),
            exclude: cli.exclude.clone(),
            open_only: cli.submit,
        }
    }

    /// Reject an empty selection before anything touches the network.
    pub fn validate(&self) -> Result<()> {
        if self.args.is_empty() && self.topic.is_none() {
            return Err(Error::Usage(NO_CHANGES.to_string()));
        }
        Ok(())
    }
}

/// Expand one positional argument.
///
/// `LOW-HIGH` with two decimal bounds is an inclusive range; anything else
/// is a literal change identifier.
pub fn expand_token(token: &str) -> Result<Vec<String>> {
    let token = token.trim();

    if let Some((low, high)) = token.split_once("..") {
        if is_number(low) && is_number(high) {
            return Err(Error::Usage(format!(
                "Invalid range '{}': use {}-{}",
                token, low, high
            )));
        }
    }

    let Some((low, high)) = token.split_once('-').filter(|(l, h)| is_number(l) && is_number(h)) else {
        return Ok(vec![token.to_string()]);
    };

    let low: u64 = low
        .parse()
        .map_err(|_| Error::Usage(format!("Invalid range '{}'", token)))?;
    let high: u64 = high
        .parse()
        .map_err(|_| Error::Usage(format!("Invalid range '{}'", token)))?;

    if low > high {
        return Err(Error::Usage(format!(
            "Invalid range '{}': start is greater than end",
            token
        )));
    }

    if high - low >= MAX_RANGE_LEN {
        return Err(Error::Usage(format!(
            "Invalid range '{}': spans more than {} changes",
            token, MAX_RANGE_LEN
        )));
    }

    Ok((low..=high).map(|n| n.to_string()).collect())
}

pub fn expand_args(args: &[String]) -> Result<Vec<String>> {
    let mut changes = Vec::new();
    for arg in args.iter().filter(|arg| !arg.trim().is_empty()) {
        changes.extend(expand_token(arg)?);
    }
    Ok(changes)
}

fn is_number(s: &str) -> bool {
    !s.is_empty() && s.chars().all(|c| c.is_ascii_digit())
}

/// Drop repeated identifiers, keeping the first occurrence.
pub fn dedup(changes: Vec<String>) -> Vec<String> {
    let mut seen = HashSet::new();
    changes
        .into_iter()
        .filter(|change| seen.insert(change.clone()))
        .collect()
}

/// Remove every identifier named in the comma-separated `exclude` list.
pub fn exclude(changes: Vec<String>, exclude: &str) -> Vec<String> {
    let excluded: HashSet<&str> = exclude
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect();

    changes
        .into_iter()
        .filter(|change| !excluded.contains(change.as_str()))
        .collect()
}

/// Build the final, duplicate-free list of changes to operate on.
pub async fn resolve_changes(api: &dyn GerritApi, selection: &ChangeSelection) -> Result<Vec<String>> {
    selection.validate()?;

    let mut changes = expand_args(&selection.args)?;

    if let Some(topic) = &selection.topic {
        println!("Fetching topic changes");
        let topic_changes = api.query_topic(topic.trim(), selection.open_only).await?;
        debug!("Topic {} has {} change(s)", topic, topic_changes.len());
        changes.extend(topic_changes.iter().map(|c| c.number.to_string()));
    }

    let mut changes = dedup(changes);

    if let Some(list) = &selection.exclude {
        changes = exclude(changes, list);
    }

    if changes.is_empty() {
        return Err(Error::Usage(NO_CHANGES.to_string()));
    }

    Ok(changes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock_gerrit::{MockCall, MockGerritClient};

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_range_expands_inclusive() {
        assert_eq!(expand_token("5-8").unwrap(), strings(&["5", "6", "7", "8"]));
        assert_eq!(expand_token("9-9").unwrap(), strings(&["9"]));
    }

    #[test]
    fn test_literal_tokens() {
        assert_eq!(expand_token("1234").unwrap(), strings(&["1234"]));
        assert_eq!(
            expand_token("my-project~master~I8473b95934b5732ac55d26311a706c9c2bde9940").unwrap(),
            strings(&["my-project~master~I8473b95934b5732ac55d26311a706c9c2bde9940"])
        );
    }

    #[test]
    fn test_reversed_range_is_usage_error() {
        assert!(matches!(expand_token("8-5"), Err(Error::Usage(_))));
    }

    #[test]
    fn test_huge_range_is_usage_error() {
        let err = expand_token("1-18446744073709551615").unwrap_err();
        assert!(matches!(err, Error::Usage(_)));
        assert!(err.to_string().contains("spans more than 10000 changes"));
        assert!(matches!(expand_token("0-18446744073709551615"), Err(Error::Usage(_))));
    }

    #[test]
    fn test_range_at_limit_is_accepted() {
        assert_eq!(expand_token("1-10000").unwrap().len(), 10_000);
        assert!(expand_token("1-10001").is_err());
    }

    #[test]
    fn test_dotted_range_is_rejected_with_hint() {
        let err = expand_token("10..12").unwrap_err();
        assert_eq!(err.to_string(), "Invalid range '10..12': use 10-12");
    }

    #[test]
    fn test_exclude() {
        let changes = exclude(strings(&["1", "2", "3"]), "2");
        assert_eq!(changes, strings(&["1", "3"]));
    }

    #[test]
    fn test_dedup_keeps_first_occurrence() {
        let changes = expand_args(&strings(&["3-5", "4-6", "3"])).unwrap();
        assert_eq!(dedup(changes), strings(&["3", "4", "5", "6"]));
    }

    #[tokio::test]
    async fn test_empty_selection_fails_without_network() {
        let mock = MockGerritClient::new();
        let result = resolve_changes(&mock, &ChangeSelection::default()).await;

        assert!(matches!(result, Err(Error::Usage(_))));
        assert!(mock.calls().is_empty());
    }

    #[tokio::test]
    async fn test_topic_changes_are_merged_and_deduplicated() {
        let mock = MockGerritClient::new();
        mock.add_topic("feature", &[11, 12]);

        let selection = ChangeSelection {
            args: strings(&["10-11"]),
            topic: Some("feature".to_string()),
            open_only: true,
            ..ChangeSelection::default()
        };
        let changes = resolve_changes(&mock, &selection).await.unwrap();

        assert_eq!(changes, strings(&["10", "11", "12"]));
        assert_eq!(
            mock.calls(),
            vec![MockCall::QueryTopic {
                topic: "feature".to_string(),
                open_only: true
            }]
        );
    }

    #[tokio::test]
    async fn test_excluding_everything_is_usage_error() {
        let mock = MockGerritClient::new();
        let selection = ChangeSelection {
            args: strings(&["1-2"]),
            exclude: Some("1, 2".to_string()),
            ..ChangeSelection::default()
        };

        assert!(matches!(
            resolve_changes(&mock, &selection).await,
            Err(Error::Usage(_))
        ));
    }

    #[tokio::test]
    async fn test_topic_failure_is_fatal() {
        let mock = MockGerritClient::new();
        let selection = ChangeSelection {
            topic: Some("missing".to_string()),
            ..ChangeSelection::default()
        };

        assert!(matches!(
            resolve_changes(&mock, &selection).await,
            Err(Error::UnexpectedStatus { .. })
        ));
    }
}
