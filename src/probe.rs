use crate::api::Error;
use crate::model::{ConnectOptions, Credentials};
use crate::portal::{Portal, PortalSession};
use serde_json::Map;
use std::fmt;

/// Number of status keys shown after a successful poll.
pub const SNAPSHOT_KEYS: usize = 5;

#[derive(Debug, Clone, PartialEq)]
pub enum ProbeOutcome {
    Connected { keys: Vec<String> },
    Failed(String),
}

impl ProbeOutcome {
    pub fn exit_code(&self) -> i32 {
        match self {
            ProbeOutcome::Connected { .. } => 0,
            ProbeOutcome::Failed(_) => 1,
        }
    }
}

impl fmt::Display for ProbeOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProbeOutcome::Connected { keys } => {
                writeln!(f, "+ CONNECTION SUCCESS!")?;
                let quoted: Vec<String> = keys
                    .iter()
                    .map(|key| format!("'{}'", key))
                    .collect();
                write!(f, "Live status snippet: [{}]", quoted.join(", "))
            }
            ProbeOutcome::Failed(message) => {
                writeln!(f, "X CONNECTION FAILED")?;
                write!(f, "Exact error: {}", message)
            }
        }
    }
}

async fn connect_and_poll<P: Portal>(
    portal: &P,
    credentials: &Credentials,
) -> Result<Vec<String>, Error> {
    let options = ConnectOptions {
        password_is_md5: false,
        configuration: Map::new(),
    };

    let session = portal.authenticate(credentials, &options).await?;
    let polled = session.poll(true).await;

    if let Err(e) = session.disconnect().await {
        log::warn!("Error while disconnecting: {}", e);
    }

    let snapshot = polled?;
    log::debug!("poll returned {} status keys", snapshot.len());

    Ok(snapshot
        .first_keys(SNAPSHOT_KEYS)
        .into_iter()
        .map(String::from)
        .collect())
}

/// One authentication attempt followed by one live poll. Every failure collapses into
/// `ProbeOutcome::Failed`.
pub async fn run<P: Portal>(portal: &P, credentials: &Credentials) -> ProbeOutcome {
    match connect_and_poll(portal, credentials).await {
        Ok(keys) => ProbeOutcome::Connected { keys },
        Err(e) => {
            log::error!("connection test for {} failed: {:?}", credentials.serial, e);
            ProbeOutcome::Failed(e.to_string())
        }
    }
}
