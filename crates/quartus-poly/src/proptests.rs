//! Property-based tests for polynomial construction invariants.
