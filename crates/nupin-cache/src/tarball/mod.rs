//! Package archive packing and unpacking
//!
//! Archives are gzipped tarballs whose entries are relative to the package
//! root.

pub mod create;
pub mod extract;

pub use create::{create_tarball, create_tarball_bytes};
pub use extract::extract_tarball;
