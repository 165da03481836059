//! Property-based test suites

mod determinism;
