//! Identity provider clients

pub mod openid;

pub use openid::OpenIdClient;
