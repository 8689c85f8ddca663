//! # slotwatch-id
//!
//! Typed identifiers for the slotwatch agent.
//!
//! Demands and their entry stacks are created once at startup from the
//! strategies file. They have no stable name of their own, so the agent mints
//! an ID for each one and uses it in logs and as the attempt counter key.
//!
//! ## ID Format
//!
//! All IDs use a prefixed format: `{prefix}_{ulid}`
//!
//! Examples:
//! - `dmd_01HV4Z2WQXKJNM8GPQY6VBKC3D`
//! - `item_01HV4Z3MXNKPQR9HSTZ7WCLD4E`
//! - `rsv_01HV4Z4NYPLTRS0JTUA8XDME5F`
//!
//! The prefix keeps a demand ID from being passed where an item ID is
//! expected, and ULIDs sort by creation time, so the IDs minted while
//! loading a strategies file keep declaration order.

mod error;
mod macros;
mod types;

pub use error::IdError;
pub use types::*;

/// Re-export ulid for consumers that need raw ULID operations
pub use ulid::Ulid;
