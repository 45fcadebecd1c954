// Copyright (c) 2025 - Cowboy AI, Inc.
//! Property-based tests for rim-infrastructure
//!
//! Run with: cargo test --test property_tests

mod property;
