//! HTTP front end for snapkv
//!
//! A thin request layer over [`snapkv_engine::StoreHandle`]:
//!
//! | Method | Path | Operation | Success |
//! |---|---|---|---|
//! | POST | `/api/v1/my/keys` | CREATE | 201 |
//! | GET | `/api/v1/my/keys/{key}` | GET | 200 / 404 |
//! | DELETE | `/api/v1/my/keys` | DELETE_ALL | 204 |
//!
//! Every request is tagged with an `x-request-id` and must declare
//! `Content-Type: application/json`.

#![warn(missing_docs)]

pub mod cli;
pub mod routes;

pub use cli::{build_cli, ServerArgs};
pub use routes::{router, ApiError, REQUEST_ID_HEADER};
