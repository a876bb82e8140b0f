use log::debug;

use crate::config::ServerProfile;
use crate::error::Result;
use crate::gerrit::{GerritApi, GerritClient};

/// Factory function to create the Gerrit client for a resolved server profile
pub fn create_gerrit_client(profile: &ServerProfile) -> Result<Box<dyn GerritApi>> {
    debug!(
        "Connecting to {} as {} ({} auth)",
        profile.base_url, profile.username, profile.auth_scheme
    );
    let client = GerritClient::new(profile)?;
    Ok(Box::new(client))
}
