use crate::error::{NasError, Result};
use crate::smb::{SmbClient, SmbEntry};
use crate::types::{ShareName, SmbCredentials};
use std::collections::HashSet;
use std::sync::Arc;

/// Lists the shares a host exposes, falling back through logins
///
/// Strategies are tried in order: the caller's credentials, anonymous, then
/// guest with an empty password. A strategy identical to one already tried is
/// skipped.
#[derive(Clone)]
pub struct ShareEnumerator {
    client: Arc<dyn SmbClient>,
}

impl ShareEnumerator {
    /// Create an enumerator over `client`
    #[must_use]
    pub fn new(client: Arc<dyn SmbClient>) -> Self {
        Self { client }
    }

    /// List shares using an optional user name and password
    ///
    /// # Errors
    ///
    /// Returns `NasError::EnumerationFailed` carrying the last strategy's
    /// error if no strategy could list the host.
    pub async fn list_shares(
        &self,
        host: &str,
        username: Option<&str>,
        password: Option<&str>,
    ) -> Result<Vec<ShareName>> {
        let supplied = SmbCredentials::from_parts(username, password);
        self.list_shares_with(host, &supplied).await
    }

    /// List shares starting from full caller credentials (domain included)
    ///
    /// # Errors
    ///
    /// Returns `NasError::EnumerationFailed` if every strategy fails.
    pub async fn list_shares_with(
        &self,
        host: &str,
        supplied: &SmbCredentials,
    ) -> Result<Vec<ShareName>> {
        let strategies = [
            ("supplied", supplied.clone()),
            ("anonymous", SmbCredentials::anonymous()),
            ("guest", SmbCredentials::guest()),
        ];

        let mut tried: Vec<&SmbCredentials> = Vec::with_capacity(strategies.len());
        let mut last_error = None;

        for (strategy, credentials) in &strategies {
            let strategy = *strategy;
            if tried.contains(&credentials) {
                continue;
            }
            tried.push(credentials);

            match self.client.list_shares(host, credentials).await {
                Ok(entries) => {
                    let shares = filter_shares(entries);
                    tracing::info!(host, strategy, shares = shares.len(), "Listed shares");
                    return Ok(shares);
                }
                Err(e) => {
                    tracing::debug!(host, strategy, error = %e, "Share listing failed");
                    last_error = Some(e);
                }
            }
        }

        let source = last_error.unwrap_or_else(|| NasError::ConnectionFailed {
            host: host.to_string(),
            message: "no credential strategy attempted".to_string(),
            source: None,
        });
        Err(NasError::EnumerationFailed {
            host: host.to_string(),
            source: Box::new(source),
        })
    }
}

/// Reduce a host root listing to browsable share names
///
/// Keeps directories only, strips trailing slashes, and drops blank and
/// `$`-suffixed names. Duplicates keep their first position.
#[must_use]
pub fn filter_shares(entries: Vec<SmbEntry>) -> Vec<ShareName> {
    let mut seen = HashSet::new();
    entries
        .into_iter()
        .filter(SmbEntry::is_dir)
        .map(|entry| ShareName::new(entry.name.trim_end_matches('/')))
        .filter(|share| !share.value.trim().is_empty() && !share.is_hidden())
        .filter(|share| seen.insert(share.value.clone()))
        .collect()
}
