//! Integration Tests Module
//!
//! End-to-end tests of the orchestration layer against a scripted in-process
//! analysis engine. Time-dependent tests run on a paused tokio clock.


// Session lifecycle, polling and stale-response races
mod session_test;

// Derived views and question answering
mod views_test;

// Connectivity and refresh-on-reconnect
mod network_test;

// Application state wiring and settings
mod state_test;
