//! Property-based tests for the pure catalog rules

mod ordering_proptest;
mod pricing_proptest;
