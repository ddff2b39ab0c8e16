pub mod history;
pub mod poll;

use num_derive::FromPrimitive;
use serde::Deserialize;

/* Generic error */
#[derive(Deserialize)]
pub struct ErrorResponse {
    #[serde(rename = "failCode")]
    pub fail_code: u32,
    pub message: Option<String>,
}

/// `failCode` values the client treats specially. Anything else is a generic API error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, FromPrimitive)]
pub enum FailCode {
    UserMustRelogin = 305,
    AccessFrequencyIsTooHigh = 407,
}
