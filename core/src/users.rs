//! Identity user management (`identity/users`).

use crate::client::{require, Client};
use crate::error::Result;
use crate::http::HttpMethod;
use crate::types::{User, Users};

impl Client {
    /// `GET identity/users/{id}`
    pub fn get_user(&self, id: &str) -> Result<User> {
        require(id, "user id")?;
        self.fetch(HttpMethod::Get, &format!("identity/users/{id}"), None::<&()>)
    }

    /// `GET identity/users`
    pub fn get_users(&self) -> Result<Users> {
        self.fetch(HttpMethod::Get, "identity/users", None::<&()>)
    }

    /// `POST identity/users`
    pub fn create_user(&self, user: &User) -> Result<User> {
        self.fetch(HttpMethod::Post, "identity/users", Some(user))
    }

    /// `PUT identity/users/{id}`, addressed by `user.id`.
    pub fn update_user(&self, user: &User) -> Result<User> {
        require(&user.id, "user id")?;
        self.fetch(HttpMethod::Put, &format!("identity/users/{}", user.id), Some(user))
    }

    /// `DELETE identity/users/{id}`
    pub fn delete_user(&self, id: &str) -> Result<()> {
        require(id, "user id")?;
        self.perform(HttpMethod::Delete, &format!("identity/users/{id}"), None::<&()>)
    }
}
