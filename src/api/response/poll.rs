use serde::Deserialize;
use serde_json::{Map, Value};

#[derive(Deserialize)]
pub struct Poll {
    pub data: Map<String, Value>,
}
