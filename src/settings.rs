use crate::api::{self, Error};
use crate::model::Api;
use config::Config;
use std::time::Duration;

const PORTAL_URL: &str = "https://s10.e3dc.com/s10/api";
const TIMEOUT_SECS: i64 = 30;

/// Portal connection settings, read from `E3DC_*` environment variables.
#[derive(Debug, Clone, serde::Deserialize)]
pub struct PortalConfig {
    pub portal_url: String,
    pub timeout_secs: u64,
}

impl PortalConfig {
    pub fn api(&self) -> Api {
        api::api(
            self.portal_url.trim_end_matches('/').to_string(),
            Duration::from_secs(self.timeout_secs),
        )
    }
}

pub fn read_settings() -> Result<PortalConfig, Error> {
    let mut settings = Config::default();
    settings
        .set_default("portal_url", PORTAL_URL)?
        .set_default("timeout_secs", TIMEOUT_SECS)?
        .merge(config::Environment::with_prefix("E3DC"))?;

    let portal: PortalConfig = settings.try_into()?;
    log::debug!("portal settings: {:?}", portal);
    Ok(portal)
}
