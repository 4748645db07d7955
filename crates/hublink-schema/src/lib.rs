//! HubLink Schema Tables
//!
//! This crate holds the schema half of the HubLink host protocol: the
//! descriptor types that generated tables are declared with, and the
//! registry that validates and freezes them. The wire codec lives in the
//! `hublink-codec` crate and drives itself entirely off a frozen registry.
//!
//! # Schema Overview
//!
//! A schema describes messages exchanged with the hub co-processor:
//!
//! - **Types** are struct-like layouts, indexed by [`TypeIndex`]. A field
//!   is a scalar, a string, an array or an embedded aggregate.
//! - **Messages** list TLV-framed fields in ascending tag order, each
//!   mandatory or optional, with exactly one terminal field.
//! - **Service entries** bind a `(message id, direction)` pair to a message
//!   descriptor and an encoded-size ceiling.
//!
//! Tables are plain `static` data. [`Registry::new`] validates them once at
//! startup and the frozen registry is then shared read-only; a table that
//! fails validation never reaches the codec.
//!
//! # Example
//!
//! ```rust,ignore
//! use hublink_schema::Registry;
//!
//! let registry = Registry::new(&TYPES, &SERVICES)?;
//! let entry = registry.services().lookup(0x0021, Direction::Response)?;
//! ```

mod descriptor;
mod error;
mod registry;
mod service;

pub use descriptor::*;
pub use error::*;
pub use registry::*;
pub use service::*;
