
/// Helper functions for writing JSON via serde
pub mod json_io;
/// Log-space probability math and Phred conversion
pub mod log_math;
