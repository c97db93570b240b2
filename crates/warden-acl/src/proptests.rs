//! Property-based tests for resolution and guarding.
