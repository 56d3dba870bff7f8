//! End-to-end tests for FireLog. The suites live under `tests/`; they start
//! the server in-process on in-memory backends and drive it through the
//! `firelog` client library.
