pub type Endpoint = str;

pub const LOGIN: &Endpoint = "/login";
pub const LOGOUT: &Endpoint = "/logout";
pub const POLL: &Endpoint = "/poll";
pub const HISTORY: &Endpoint = "/history";
