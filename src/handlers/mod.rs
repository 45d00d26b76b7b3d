//! HTTP handlers, one module per resource.
//!
//! Every handler returns `ApiResult<_>`; role and ownership checks run at the
//! top of the handler body, before anything is read or written.

pub mod admin;
pub mod athletes;
pub mod auth;
pub mod dashboard;
pub mod events;
pub mod notifications;
pub mod seed;
pub mod teams;
