//! Tool subdomain - the contract between agents and external tool providers.
//!
//! Each agent works through exactly one [`session::ToolSession`]. A session
//! is opened before the investigation starts, exposes a
//! [`entities::ToolCatalog`] while it is open, and is closed afterwards.
//!
//! ```text
//! open() ──► ToolCatalog ──► invoke(ToolCall)* ──► close()
//! ```

pub mod entities;
pub mod session;
pub mod value_objects;
