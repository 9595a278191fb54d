//! Mimic: an HTTP mock/record server.
//!
//! Requests are funneled through an ordered chain of handlers rooted
//! under a configured base path: mock-definition CRUD, named variables,
//! recorded traffic, and a record-mode toggle, with a mock-serving
//! fallthrough for everything else. Each request resolves exactly one
//! mutable session state through the [`state::StateStore`].

pub mod config;
pub mod dispatch;
pub mod handlers;
pub mod http;
pub mod server;
pub mod state;
