//! Wiring harness model.
//!
//! Connectors and cables are registered on a [`Harness`], joined by
//! connection sets, then finalized. A finalized harness feeds a [`Bom`] and a
//! renderer-agnostic [`Diagram`].

pub mod bom;
#[cfg(feature = "table")]
mod bom_table;
pub mod color;
pub mod component;
pub mod designator;
pub mod diagram;
pub mod document;
pub mod error;
pub mod harness;
pub mod options;
pub mod reference;

pub use bom::{Bom, BomWriteError};
pub use designator::Designator;
pub use diagram::{Diagram, build_diagram};
pub use document::HarnessDocument;
pub use error::{ErrorKind, HarnessError, Result};
pub use harness::Harness;
pub use options::HarnessOptions;
