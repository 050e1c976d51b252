//! Integration tests
//!
//! API tests run against the in-memory store; database tests need
//! `DATABASE_URL`.

pub mod database;
