use std::fmt;

/// Login used against an SMB host
///
/// Held only for the duration of a call. `Debug` never prints the password.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct SmbCredentials {
    /// Workgroup or domain
    pub domain: Option<String>,
    /// User name; `None` for anonymous
    pub username: Option<String>,
    /// Password; `None` for anonymous
    pub password: Option<String>,
}

/// User name most NAS firmwares map to the guest account
pub const GUEST_USER: &str = "guest";

impl SmbCredentials {
    /// Credentials for a named user
    #[must_use]
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            domain: None,
            username: Some(username.into()),
            password: Some(password.into()),
        }
    }

    /// Build from optional caller-supplied values
    ///
    /// Blank user names are treated as absent.
    #[must_use]
    pub fn from_parts(username: Option<&str>, password: Option<&str>) -> Self {
        let username = username
            .map(str::trim)
            .filter(|u| !u.is_empty())
            .map(ToString::to_string);
        Self {
            domain: None,
            password: username
                .as_ref()
                .and(password.map(ToString::to_string)),
            username,
        }
    }

    /// No user, no password
    #[must_use]
    pub fn anonymous() -> Self {
        Self::default()
    }

    /// The guest account with an empty password
    #[must_use]
    pub fn guest() -> Self {
        Self::new(GUEST_USER, "")
    }

    /// Set the domain or workgroup
    #[must_use]
    pub fn with_domain(mut self, domain: impl Into<String>) -> Self {
        self.domain = Some(domain.into());
        self
    }

    /// True when no user name is set
    #[must_use]
    pub fn is_anonymous(&self) -> bool {
        self.username.is_none()
    }
}

impl fmt::Debug for SmbCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SmbCredentials")
            .field("domain", &self.domain)
            .field("username", &self.username)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}
