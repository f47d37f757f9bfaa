//! Advanced-hunting API access for huntsize.
//!
//! This crate covers everything between the estimator and the service:
//!
//! - [`query`] - Count and sample query construction
//! - [`TokenProvider`] - OAuth2 client-credentials token acquisition
//! - [`HuntingClient`] - Authenticated HTTP client with retries
//! - [`QueryRunner`] - The "query in, rows out" seam the estimator depends on
//! - [`QueryResult`] / [`Row`] - Typed view over response rows

#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/huntsize/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod auth;
mod client;
pub mod query;
mod row;

pub use auth::{
    AccessToken, AuthConfig, AuthError, DEFAULT_AUTHORITY, DEFAULT_SCOPE, MAX_TOKEN_LIFETIME_SECS,
    TokenProvider,
};
pub use client::{
    ClientConfig, DEFAULT_BASE_URL, HuntingClient, QueryError, QueryRunner, RUN_QUERY_PATH,
};
pub use row::{Column, QueryResult, Row};
