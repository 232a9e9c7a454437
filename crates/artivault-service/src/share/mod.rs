//! Anonymous share links.

pub mod link;
pub mod service;

pub use link::{generate_token, share_url};
pub use service::{CreateShareRequest, ShareService};
