//! Content-access layer for the OnePage blog front-end.
//!
//! Posts, categories, tags and the author profile live in a remote headless
//! content store exposing a generic list-query API. This crate provides the
//! typed client for that API, slug and prev/next resolution over fetched
//! snapshots, relative-time formatting for post timestamps, and the route
//! pre-enumeration the static router needs ahead of a build.

pub mod application;
pub mod cache;
pub mod config;
pub mod domain;
pub mod infra;
pub mod util;
