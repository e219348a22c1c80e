//! Integration tests for Summoner-Harvest
//!
//! These tests use wiremock to stand in for the remote API and drive the
//! fetcher and the crawl cycle against an in-memory or temporary database.

mod common;
mod fetcher_tests;
