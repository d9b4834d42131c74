//! Integration tests for noteomatic-deploy
//!
//! These tests spawn the actual binary and test end-to-end behavior.
//! None of them touch the host: every invocation points the config file at a
//! temp directory and only read-only or render commands are exercised.
