pub mod api;
pub mod auth;
pub mod client;
pub mod device;

pub use auth::DeviceCode;
pub use client::{AuthState, RequestOptions, TraktClient};
pub use device::{poll_for_token, TokenPoller};
