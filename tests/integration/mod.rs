//! Integration tests for the Corporate Memory query runner.

pub mod http_client_test;
pub mod host_test;
pub mod translate_test;
