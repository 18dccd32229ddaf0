//! Property-based tests for the prime-field arithmetic.
