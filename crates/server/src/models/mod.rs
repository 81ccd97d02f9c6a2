mod conversation;
mod message;
mod photo;
mod user;

pub use conversation::*;
pub use message::*;
pub use photo::*;
pub use user::*;

/// The actor resolved from the bearer credential of a request.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub id: i64,
    pub username: String,
}
