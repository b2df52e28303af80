//! The product version and where it is stored.
//!
//! [`VersionTuple`] is the single source for every textual form of the
//! version. [`resource`] keeps it in the resource descriptor and [`binary`]
//! reads it back from a built PE image.

pub mod binary;
pub mod encoding;
pub mod resource;
pub mod tuple;

pub use binary::binary_version;
pub use resource::{read_version, write_version};
pub use tuple::{BumpKind, ParseVersionError, VersionTuple};
