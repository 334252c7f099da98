//! Open Packaging Conventions (OPC) implementation.
//!
//! This module provides the subset of the OPC specification a spreadsheet
//! package needs:
//!
//! - Package structure (parts, relationships)
//! - Content type management
//! - ZIP-based physical packaging that preserves member order

pub mod constants;
pub mod content_types;
pub mod error;
pub mod package;
pub mod packuri;
pub mod phys_pkg;
pub mod rel;

// Re-export commonly used types
pub use content_types::ContentTypes;
pub use error::OpcError;
pub use package::OpcPackage;
pub use packuri::PackURI;
pub use rel::{Relationship, Relationships};
