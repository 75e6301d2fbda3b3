//! Constants for the record module (chunking, transport timeouts).

/// Largest slice written to disk between two durable syncs.
pub const CHUNK_SIZE: usize = 4096;

/// Default HTTP connect timeout (30 seconds).
pub const CONNECT_TIMEOUT_SECS: u64 = 30;

/// Default idle timeout between two body reads (30 seconds).
///
/// Live streams never finish, so no total request timeout is applied.
pub const READ_TIMEOUT_SECS: u64 = 30;
