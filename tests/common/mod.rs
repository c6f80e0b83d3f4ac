// tests/common/mod.rs
#![allow(dead_code)]
#![allow(unused_imports)]

pub use childpipe_test_utils::{builders, fake_probe, init_tracing, with_timeout};

pub type TestResult = Result<(), Box<dyn std::error::Error>>;
