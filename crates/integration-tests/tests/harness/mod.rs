//! Shared test harness: mock upstream, test server, config builder

#![allow(dead_code)]

pub mod config;
pub mod mock_upstream;
pub mod server;
