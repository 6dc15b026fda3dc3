//! Reasoning backend response types.

pub mod response;
