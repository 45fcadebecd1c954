// Copyright (c) 2025 - Cowboy AI, Inc.
//! Property-based tests

mod listener_gate;
mod naming;
mod subnets;
