//! HTTP boundary, versioned by path.

pub mod v1;
