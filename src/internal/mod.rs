//! Internal Implementation Details
//!
//! Not part of the public API; the constants that are meant for users are
//! re-exported from [`crate::constants`].

pub(crate) mod constants;
