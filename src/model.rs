use crate::api::Error;
use chrono::NaiveDate;
use serde_json::{Map, Value};
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

pub const DATE_FORMAT: &str = "%Y-%m-%d";

#[derive(Clone)]
pub struct Credentials {
    pub serial: String,
    pub username: String,
    pub password: String,
}

/* Keep the password out of logs */
impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("serial", &self.serial)
            .field("username", &self.username)
            .field("password", &"***")
            .finish()
    }
}

/// Extra knobs passed along with the login request.
#[derive(Debug, Clone, Default)]
pub struct ConnectOptions {
    pub password_is_md5: bool,
    pub configuration: Map<String, Value>,
}

#[derive(Debug, Clone)]
pub struct Api {
    pub portal_url: String,
    pub timeout: Duration,
}

#[derive(Debug)]
pub struct LoggedInApi {
    pub portal_url: String,
    pub token: String,
    pub client: reqwest::Client,
}

/// Live values of one poll, in the order the portal returned them.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StatusSnapshot(pub Map<String, Value>);

impl StatusSnapshot {
    pub fn first_keys(&self, n: usize) -> Vec<&str> {
        self.0.keys().take(n).map(String::as_str).collect()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct HistoricalRecord {
    pub timestamp: String,
    pub solar_production: f64,
    pub bat_power_in: f64,
    pub bat_power_out: f64,
    pub grid_power_out: f64,
    pub grid_power_in: f64,
    pub consumption: f64,
    pub autarky: f64,
    pub self_consumption: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    /// Parse both ends as `YYYY-MM-DD`. An inverted range is passed through untouched.
    pub fn parse(start: &str, end: &str) -> Result<DateRange, Error> {
        Ok(DateRange {
            start: parse_date(start)?,
            end: parse_date(end)?,
        })
    }
}

pub fn parse_date(s: &str) -> Result<NaiveDate, Error> {
    NaiveDate::parse_from_str(s, DATE_FORMAT).map_err(|e| Error::DateError(s.to_string(), e))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    QuarterHour,
    Hour,
    Day,
}

impl Default for Resolution {
    fn default() -> Self {
        Resolution::Day
    }
}

impl Resolution {
    pub fn as_str(&self) -> &'static str {
        match self {
            Resolution::QuarterHour => "15min",
            Resolution::Hour => "hour",
            Resolution::Day => "day",
        }
    }
}

impl fmt::Display for Resolution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Resolution {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "15min" => Ok(Resolution::QuarterHour),
            "hour" => Ok(Resolution::Hour),
            "day" => Ok(Resolution::Day),
            other => Err(Error::UnknownResolution(other.to_string())),
        }
    }
}
