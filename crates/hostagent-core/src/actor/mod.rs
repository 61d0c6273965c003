//! Actor implementations
//!
//! Each registered job runs as one `JobActor`.

pub mod job;
