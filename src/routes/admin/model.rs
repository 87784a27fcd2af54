use serde::{Deserialize, Serialize};

use crate::auth::Account;

#[derive(Debug, Deserialize)]
pub struct DeleteUserQuery {
    #[serde(default)]
    pub username: String,
}

#[derive(Debug, Deserialize)]
pub struct ListUsersQuery {
    #[serde(rename = "sinceTime")]
    pub since_time: i64,
}

#[derive(Debug, Serialize)]
pub struct ListUsersResponse {
    pub users: Vec<Account>,
}
