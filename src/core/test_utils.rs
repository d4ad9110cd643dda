//! Test utilities for arena-based testing.
//!
//! Provides a fixture that owns a scratch arena and a buffer of guest code,
//! so tests can translate short instruction sequences without wiring up a
//! memory model.
