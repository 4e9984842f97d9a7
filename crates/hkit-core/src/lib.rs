pub mod config;
pub mod logging;

pub mod batch;
pub mod browser_login;
pub mod cloud_auth;
pub mod credentials;
pub mod domain;
pub mod http;
pub mod pagination;
pub mod tree;
