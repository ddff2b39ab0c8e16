use serde::Deserialize;
use serde_json::Value;

/// Accept a metric as JSON number or numeric string. Anything else (missing, `null`, text)
/// reads as `None`.
fn metric<'de, D: serde::Deserializer<'de>>(d: D) -> Result<Option<f64>, D::Error> {
    let value = Value::deserialize(d)?;

    Ok(match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    })
}

/// One row of `/history`.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Data {
    #[serde(default)]
    pub timestamp: Value,
    #[serde(default, deserialize_with = "metric")]
    pub solar_production: Option<f64>,
    #[serde(default, deserialize_with = "metric")]
    pub bat_power_in: Option<f64>,
    #[serde(default, deserialize_with = "metric")]
    pub bat_power_out: Option<f64>,
    #[serde(default, deserialize_with = "metric")]
    pub grid_power_out: Option<f64>,
    #[serde(default, deserialize_with = "metric")]
    pub grid_power_in: Option<f64>,
    #[serde(default, deserialize_with = "metric")]
    pub consumption: Option<f64>,
    #[serde(default, deserialize_with = "metric")]
    pub autarky: Option<f64>,
    #[serde(default, deserialize_with = "metric")]
    pub self_consumption: Option<f64>,
}

#[derive(Deserialize)]
pub struct History {
    pub data: Vec<Data>,
}
