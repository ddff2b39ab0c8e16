pub mod endpoint;
pub mod error;
pub mod response;

use crate::model;
pub use error::Error;
use reqwest::Response;
use response::history::History;
use response::poll::Poll;
use response::{ErrorResponse, FailCode};
use serde_json::{json, Value};
use std::time::Duration;

const TOKEN: &str = "E3DC-TOKEN";

pub fn api(portal_url: String, timeout: Duration) -> model::Api {
    model::Api {
        portal_url,
        timeout,
    }
}

fn extract_token(response: &Response) -> Result<String, Error> {
    response
        .cookies()
        .find(|cookie| cookie.name() == TOKEN)
        .ok_or_else(|| {
            Error::LoginError(format!(
                "No {} received (server responded {})",
                TOKEN,
                response.status()
            ))
        })
        .map(|cookie| String::from(cookie.value()))
}

/// Map Non-200 API response to Error
fn map_api_err(error: reqwest::Error) -> Error {
    match error.status() {
        Some(http::StatusCode::TOO_MANY_REQUESTS) => Error::RateExceeded(error.to_string()),
        Some(http::StatusCode::UNAUTHORIZED) => Error::LoginError(error.to_string()),
        _ => Error::ApiError(error.to_string()),
    }
}

/// Process value of valid HTTP response (2xx) to identify potential API-level error indicated
/// with non-true `success`. Return specific or generic error in that case or carry the `value`
/// forward if it is identified as successful response.
fn map_response_status(value: Value) -> Result<Value, Error> {
    let success = value
        .get("success")
        .and_then(Value::as_bool)
        .unwrap_or(false);

    if success {
        return Ok(value);
    }

    let failure = match serde_json::from_value::<ErrorResponse>(value.clone()) {
        Ok(failure) => failure,
        Err(_) => return Err(Error::ApiError(value.to_string())),
    };
    let description = match failure.message {
        Some(message) => format!("Error {}: {}", failure.fail_code, message),
        None => format!("Error {}: {}", failure.fail_code, value),
    };

    match num::FromPrimitive::from_u32(failure.fail_code) {
        /* {"data":"USER_MUST_RELOGIN","failCode":305,"success":false} */
        Some(FailCode::UserMustRelogin) => Err(Error::LoginError(description)),
        /* {"data":"ACCESS_FREQUENCY_IS_TOO_HIGH","failCode":407,"success":false} */
        Some(FailCode::AccessFrequencyIsTooHigh) => Err(Error::RateExceeded(description)),
        None => Err(Error::ApiError(description)),
    }
}

async fn read_response(endpoint: &endpoint::Endpoint, response: Response) -> Result<Value, Error> {
    let text = response
        .text()
        .await
        .map_err(|e| Error::ApiError(format!("Error reading API response: {}", e)))?;

    log::trace!("endpoint: {}, response_text: {}", endpoint, text);

    serde_json::from_str::<Value>(&text)
        .map_err(|e| Error::InvalidResponse(text, e.to_string()))
        .and_then(map_response_status)
}

/// Open a session for `credentials`. The token is handed out as a cookie and echoed back as a
/// header on every later request.
pub async fn login(
    api: &model::Api,
    credentials: &model::Credentials,
    options: &model::ConnectOptions,
) -> Result<model::LoggedInApi, Error> {
    let client = reqwest::ClientBuilder::new()
        .cookie_store(true)
        .timeout(api.timeout)
        .build()
        .or(Err(Error::InternalError))?;
    let url = format!("{}{}", api.portal_url, endpoint::LOGIN);

    let request_body = json!({
        "serialNumber": credentials.serial,
        "userName": credentials.username,
        "password": credentials.password,
        "passwordIsMd5": options.password_is_md5,
        "configuration": options.configuration,
    });

    log::debug!(
        "logging in to {} as {} (serial {})",
        api.portal_url,
        credentials.username,
        credentials.serial
    );

    let response = client
        .post(url)
        .json(&request_body)
        .send()
        .await
        .and_then(Response::error_for_status)
        .map_err(map_api_err)?;

    let token = extract_token(&response);
    read_response(endpoint::LOGIN, response).await?;

    Ok(model::LoggedInApi {
        portal_url: api.portal_url.to_owned(),
        token: token?,
        client,
    })
}

async fn post(
    api: &model::LoggedInApi,
    endpoint: &endpoint::Endpoint,
    data: Option<&Value>,
) -> Result<Value, Error> {
    let url = format!("{}{}", api.portal_url, endpoint);

    log::trace!("endpoint: {}, data: {:?}", endpoint, data);

    let request = match data {
        Some(data) => api.client.post(url).json(data),
        None => api.client.post(url),
    }
    .header(TOKEN, api.token.to_owned());

    let response = request
        .send()
        .await
        .and_then(Response::error_for_status)
        .map_err(map_api_err)?;

    read_response(endpoint, response).await
}

pub async fn logout(api: &model::LoggedInApi) -> Result<(), Error> {
    post(api, endpoint::LOGOUT, None).await.map(|_| ())
}

/// Read live values of the installation.
pub async fn poll(
    api: &model::LoggedInApi,
    keep_alive: bool,
) -> Result<model::StatusSnapshot, Error> {
    let request_body = json!({ "keepAlive": keep_alive });

    let value = post(api, endpoint::POLL, Some(&request_body)).await?;

    serde_json::from_value::<Poll>(value)
        .map(|response| model::StatusSnapshot(response.data))
        .or(Err(Error::UnexpectedApiResponse))
}

fn timestamp_text(value: Value) -> String {
    match value {
        Value::String(s) => s,
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

/// Fetch the whole `range` in one request. Rows come back in the order the portal sent them.
pub async fn history(
    api: &model::LoggedInApi,
    range: &model::DateRange,
    resolution: model::Resolution,
) -> Result<Vec<model::HistoricalRecord>, Error> {
    let request_body = json!({
        "startDate": range.start.format(model::DATE_FORMAT).to_string(),
        "endDate": range.end.format(model::DATE_FORMAT).to_string(),
        "resolution": resolution.as_str(),
    });

    let value = post(api, endpoint::HISTORY, Some(&request_body)).await?;

    serde_json::from_value::<History>(value)
        .or(Err(Error::UnexpectedApiResponse))
        .map(|response| {
            response
                .data
                .into_iter()
                .map(|row| model::HistoricalRecord {
                    timestamp: timestamp_text(row.timestamp),
                    solar_production: row.solar_production.unwrap_or(0.0),
                    bat_power_in: row.bat_power_in.unwrap_or(0.0),
                    bat_power_out: row.bat_power_out.unwrap_or(0.0),
                    grid_power_out: row.grid_power_out.unwrap_or(0.0),
                    grid_power_in: row.grid_power_in.unwrap_or(0.0),
                    consumption: row.consumption.unwrap_or(0.0),
                    autarky: row.autarky.unwrap_or(0.0),
                    self_consumption: row.self_consumption.unwrap_or(0.0),
                })
                .collect()
        })
}
