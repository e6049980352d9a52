//! Contains the interprocess-communication module of this crate.
pub mod ipc;
