//! Core library for `KeepTouch`.
//!
//! Contains the generic step flow controller, the persisted state store that
//! mirrors a value into a storage slot, the reconnect widget that composes
//! the two, and the plan and lead domain shared by the HTTP server and the
//! terminal client. This crate depends on `keeptouch-storage` for the storage
//! backend trait and performs no HTTP itself; network collaborators are
//! injected through the traits in [`widget`], [`plan`] and [`lead`].

pub mod error;
pub mod flow;
pub mod lead;
pub mod persist;
pub mod plan;
pub mod widget;
