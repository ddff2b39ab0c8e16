//! Capability seam between the command-line flows and the portal client.
//!
//! `probe` and `export` only talk to these traits, which keeps them testable
//! against [`mock::MockPortal`] without a network.

use crate::api::{self, Error};
use crate::model::{
    Api, ConnectOptions, Credentials, DateRange, HistoricalRecord, LoggedInApi, Resolution,
    StatusSnapshot,
};
use async_trait::async_trait;

#[async_trait]
pub trait Portal: Sync {
    type Session: PortalSession;

    async fn authenticate(
        &self,
        credentials: &Credentials,
        options: &ConnectOptions,
    ) -> Result<Self::Session, Error>;
}

/// An authenticated handle. It stays usable until `disconnect` is called.
#[async_trait]
pub trait PortalSession: Send + Sync {
    async fn poll(&self, keep_alive: bool) -> Result<StatusSnapshot, Error>;

    async fn history(
        &self,
        range: &DateRange,
        resolution: Resolution,
    ) -> Result<Vec<HistoricalRecord>, Error>;

    async fn disconnect(&self) -> Result<(), Error>;
}

#[async_trait]
impl Portal for Api {
    type Session = LoggedInApi;

    async fn authenticate(
        &self,
        credentials: &Credentials,
        options: &ConnectOptions,
    ) -> Result<LoggedInApi, Error> {
        api::login(self, credentials, options).await
    }
}

#[async_trait]
impl PortalSession for LoggedInApi {
    async fn poll(&self, keep_alive: bool) -> Result<StatusSnapshot, Error> {
        api::poll(self, keep_alive).await
    }

    async fn history(
        &self,
        range: &DateRange,
        resolution: Resolution,
    ) -> Result<Vec<HistoricalRecord>, Error> {
        api::history(self, range, resolution).await
    }

    async fn disconnect(&self) -> Result<(), Error> {
        api::logout(self).await
    }
}
