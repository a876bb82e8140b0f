use std::collections::BTreeMap;

use serde::Serialize;

use crate::error::{Error, Result};

/// Votes applied to a change's current revision before submitting.
///
/// Serialises to the Gerrit review input, e.g.
/// `{"labels": {"Code-Review": "+2", "Verified": "+1"}}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct LabelVotes {
    labels: BTreeMap<String, String>,
}

impl LabelVotes {
    /// Zip comma-separated label names with comma-separated votes by position.
    ///
    /// Unsigned votes get a `+` prefix, so `2` and `+2` both mean `+2`.
    pub fn from_lists(labels: &str, ranges: &str) -> Result<Self> {
        let names = split_list(labels);
        let votes = split_list(ranges);

        if names.is_empty() {
            return Err(Error::Config("No labels given".to_string()));
        }
        if names.len() != votes.len() {
            return Err(Error::Config(format!(
                "Failed to parse labels: {} label(s) but {} range(s)",
                names.len(),
                votes.len()
            )));
        }

        let mut parsed = BTreeMap::new();
        for (name, vote) in names.into_iter().zip(votes) {
            parsed.insert(name.to_string(), normalize_vote(vote)?);
        }

        Ok(Self { labels: parsed })
    }

    pub fn get(&self, label: &str) -> Option<&str> {
        self.labels.get(label).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }
}

fn split_list(list: &str) -> Vec<&str> {
    list.split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .collect()
}

fn normalize_vote(vote: &str) -> Result<String> {
    let (sign, digits) = match vote.strip_prefix(['+', '-']) {
        Some(rest) => (&vote[..1], rest),
        None => ("+", vote),
    };

    if digits.is_empty() || !digits.chars().all(|c| c.is_ascii_digit()) {
        return Err(Error::Config(format!("Failed to parse labels: invalid vote '{}'", vote)));
    }

    Ok(format!("{}{}", sign, digits))
}
