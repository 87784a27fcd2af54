use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize)]
pub struct MeResponse {
    pub account_id: i64,
    pub username: String,
}
