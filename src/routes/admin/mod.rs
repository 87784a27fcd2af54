mod handler;
mod model;

pub use handler::{delete_user, list_users};
pub use model::{DeleteUserQuery, ListUsersQuery, ListUsersResponse};
