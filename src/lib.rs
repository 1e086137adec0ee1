//! Response caching and touch gesture recognition for the IELTS practice client.
//!
//! `cache` and `gesture` are the reusable cores; `api` puts the cache in front
//! of the practice backend, and the remaining modules back the `ielts-client`
//! binary's pad, replay and fetch commands.

pub mod api;
pub mod app;
pub mod cache;
pub mod config;
pub mod event;
pub mod gesture;
pub mod logging;
pub mod preset;
pub mod replay;
pub mod ui;
