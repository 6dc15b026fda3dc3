//! File-backed trace sink

pub mod jsonl_trace;

pub use jsonl_trace::JsonlTraceSink;
