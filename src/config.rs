use std::path::{Path, PathBuf};

use ini::{Ini, ParseOption};
use log::debug;
use url::Url;

use crate::auth::AuthScheme;
use crate::cli::Cli;
use crate::error::{Error, Result};
use crate::labels::LabelVotes;

pub const CONFIG_FILENAME: &str = ".gerrit.cfg";
const DEFAULTS_SECTION: &str = "Defaults";

/// The parsed `~/.gerrit.cfg` store.
///
/// `[Defaults]` holds `review_url`; every other section is named after a
/// server URL and holds that server's credentials and default labels.
#[derive(Debug, Clone, Default)]
pub struct ConfigFile {
    ini: Ini,
}

impl ConfigFile {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn parse(contents: &str) -> Result<Self> {
        // Passwords may contain quotes or backslashes; take values literally.
        let options = ParseOption {
            enabled_quote: false,
            enabled_escape: false,
            ..ParseOption::default()
        };
        let ini = Ini::load_from_str_opt(contents, options)
            .map_err(|e| Error::Config(format!("Failed to parse config: {}", e)))?;
        Ok(Self { ini })
    }

    /// Load an explicitly named config file; it must exist.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| {
            Error::Config(format!("Failed to read config file {}: {}", path.display(), e))
        })?;
        Self::parse(&contents)
    }

    /// Load `~/.gerrit.cfg`, treating a missing file as an empty config.
    pub fn load_default() -> Result<Self> {
        match Self::default_path() {
            Some(path) if path.exists() => Self::load(&path),
            Some(path) => {
                debug!("No config file at {}", path.display());
                Ok(Self::empty())
            }
            None => Ok(Self::empty()),
        }
    }

    pub fn default_path() -> Option<PathBuf> {
        dirs::home_dir().map(|home| home.join(CONFIG_FILENAME))
    }

    /// A trimmed, non-empty value from `section`.
    ///
    /// Section names are case-sensitive, keys are not.
    pub fn get(&self, section: &str, key: &str) -> Option<&str> {
        self.ini
            .section(Some(section))
            .and_then(|props| {
                props
                    .iter()
                    .find(|(name, _)| name.trim().eq_ignore_ascii_case(key))
                    .map(|(_, value)| value)
            })
            .map(str::trim)
            .filter(|value| !value.is_empty())
    }

    pub fn has_section(&self, section: &str) -> bool {
        self.ini.section(Some(section)).is_some()
    }
}

/// Everything needed to talk to one Gerrit server for the whole run.
#[derive(Debug, Clone)]
pub struct ServerProfile {
    /// The URL as given on the command line or in `[Defaults]`
    pub review_url: String,
    /// `review_url` with a scheme and without a trailing slash
    pub base_url: Url,
    pub username: String,
    pub password: String,
    pub auth_scheme: AuthScheme,
    /// Only resolved when submitting
    pub labels: Option<LabelVotes>,
}

impl ServerProfile {
    /// Merge command-line options with the config store, command line first.
    pub fn resolve(cli: &Cli, config: &ConfigFile) -> Result<Self> {
        let review_url = cli
            .review_url
            .as_deref()
            .map(str::trim)
            .filter(|url| !url.is_empty())
            .or_else(|| config.get(DEFAULTS_SECTION, "review_url"))
            .ok_or_else(|| Error::Config("Review URL must be set".to_string()))?
            .to_string();

        let base_url = normalize_review_url(&review_url)?;
        let section = server_section(config, &review_url, &base_url);
        debug!("Using config section [{}]", section);

        let username = cli
            .username
            .clone()
            .or_else(|| config.get(&section, "username").map(str::to_string))
            .ok_or_else(|| Error::Config("Username must be set".to_string()))?;

        let password = cli
            .password
            .clone()
            .or_else(|| config.get(&section, "password").map(str::to_string))
            .ok_or_else(|| Error::Config("Password must be set".to_string()))?;

        let auth_scheme = match cli.auth_scheme {
            Some(arg) => arg.into(),
            None => match config.get(&section, "auth_scheme") {
                Some(value) => value.parse()?,
                None => AuthScheme::default(),
            },
        };

        let labels = if cli.submit {
            Some(resolve_labels(cli, config, &section)?)
        } else {
            None
        };

        Ok(Self {
            review_url,
            base_url,
            username,
            password,
            auth_scheme,
            labels,
        })
    }
}

fn resolve_labels(cli: &Cli, config: &ConfigFile, section: &str) -> Result<LabelVotes> {
    let labels = cli
        .labels
        .as_deref()
        .or_else(|| config.get(section, "labels"))
        .ok_or_else(|| {
            Error::Config("Labels must be set to submit (--labels or 'labels' in config)".to_string())
        })?;

    let ranges = cli
        .labels_ranges
        .as_deref()
        .or_else(|| config.get(section, "labels_ranges"))
        .or_else(|| config.get(section, "labels_range"))
        .ok_or_else(|| {
            Error::Config(
                "Label ranges must be set to submit (--labels-ranges or 'labels_ranges' in config)"
                    .to_string(),
            )
        })?;

    LabelVotes::from_lists(labels, ranges)
}

/// Pick the section holding this server's settings.
///
/// The URL exactly as given wins; otherwise the normalised form is tried so
/// that `review.example.org` finds `[https://review.example.org]`.
fn server_section(config: &ConfigFile, review_url: &str, base_url: &Url) -> String {
    let normalized = base_url.as_str().trim_end_matches('/');
    if !config.has_section(review_url) && config.has_section(normalized) {
        normalized.to_string()
    } else {
        review_url.to_string()
    }
}

/// Accept a bare host or a full URL, defaulting the scheme to `https`.
pub fn normalize_review_url(raw: &str) -> Result<Url> {
    let trimmed = raw.trim().trim_end_matches('/');
    if trimmed.is_empty() {
        return Err(Error::Config("Review URL must be set".to_string()));
    }

    let with_scheme = if trimmed.contains("://") {
        trimmed.to_string()
    } else {
        format!("https://{}", trimmed)
    };

    let url = Url::parse(&with_scheme)
        .map_err(|e| Error::Config(format!("Invalid review URL '{}': {}", raw, e)))?;

    if url.cannot_be_a_base() || url.host_str().is_none() {
        return Err(Error::Config(format!("Invalid review URL '{}'", raw)));
    }

    Ok(url)
}
