//! Unit tests for individual components, exercised through the public API.

mod unit;
