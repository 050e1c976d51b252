//! Database integration tests

mod postgres_test;
