// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: Apache-2.0

//! Test harness for the content guard.
//!
//! Provides an in-process mock of the entries backend, payload corpora and
//! outcome tallies for attack simulation.

#![allow(dead_code)]

pub mod metrics;
pub mod mock_backend;
pub mod payloads;
