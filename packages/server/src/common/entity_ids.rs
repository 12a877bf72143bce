//! Typed ID definitions for domain entities.

pub use super::id::Id;

/// Marker type for Link entities (submitted links).
pub struct Link;

/// Typed ID for Link entities.
pub type LinkId = Id<Link>;
