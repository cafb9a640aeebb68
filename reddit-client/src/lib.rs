pub mod api;
pub mod auth;
pub mod fullname;
pub mod retry;
pub mod types;

pub use api::{Client, ClientConfig, DEFAULT_BASE_URL, DEFAULT_USER_AGENT};
pub use fullname::{comment_fullname, post_fullname};
pub use types::{Comment, EditResponse, Listing, Post};
