use serde::{Deserialize, Serialize};

/// Which side of the replication channel this process is on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionRole {
    /// Drives the auction and publishes snapshots
    Host,
    /// Polls and mirrors the host's snapshots
    Viewer,
}

impl SessionRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            SessionRole::Host => "host",
            SessionRole::Viewer => "viewer",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "host" => Some(SessionRole::Host),
            "viewer" => Some(SessionRole::Viewer),
            _ => None,
        }
    }

    pub fn is_host(&self) -> bool {
        matches!(self, SessionRole::Host)
    }
}
