//! Tests for the revocation engine

pub(crate) mod mocks;

mod policy_tests;
