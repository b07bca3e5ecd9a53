//! Shared test utilities for domain testing
//!
//! This crate provides reusable test infrastructure for the domain crates:
//! - `TestClickHouse`: ClickHouse container with automatic cleanup (feature: "clickhouse")
//! - `TestDataBuilder`: Deterministic ids and embeddings (always available)
//! - `assertions`: Custom assertion helpers (always available)
//!
//! # Features
//!
//! - `clickhouse`: Enables ClickHouse test infrastructure
//! - `all`: Enables all store test infrastructure
//!
//! # Usage
//!
//! ```rust
//! use test_utils::TestDataBuilder;
//!
//! let builder = TestDataBuilder::from_test_name("my_search_test");
//! let records = builder.records("doc", 100, 8);
//! assert_eq!(records.len(), 100);
//! assert_eq!(records[0].1.len(), 8);
//! ```
//!
//! ## ClickHouse Testing
//!
//! Add `features = ["clickhouse"]` to your dev-dependencies:
//!
//! ```toml
//! [dev-dependencies]
//! test-utils = { workspace = true, features = ["clickhouse"] }
//! ```
//!
//! Tests that start containers need Docker; mark them `#[ignore]`.

#[cfg(feature = "clickhouse")]
mod clickhouse;

#[cfg(feature = "clickhouse")]
pub use clickhouse::TestClickHouse;

/// Builder for test data with deterministic randomization
///
/// The same seed always produces the same ids and embeddings.
pub struct TestDataBuilder {
    seed: u64,
}

impl TestDataBuilder {
    /// Create a new builder with a seed (for deterministic tests)
    pub fn new(seed: u64) -> Self {
        Self { seed }
    }

    /// Create from test name (generates seed from test name hash)
    ///
    /// # Example
    ///
    /// ```
    /// use test_utils::TestDataBuilder;
    ///
    /// let builder = TestDataBuilder::from_test_name("test_top_k");
    /// ```
    pub fn from_test_name(name: &str) -> Self {
        use std::collections::hash_map::DefaultHasher;
        use std::hash::{Hash, Hasher};

        let mut hasher = DefaultHasher::new();
        name.hash(&mut hasher);
        Self::new(hasher.finish())
    }

    /// Unique id within this builder, e.g. `test-doc-12345-7`
    pub fn id(&self, prefix: &str, n: usize) -> String {
        format!("test-{}-{}-{}", prefix, self.seed, n)
    }

    /// Embedding number `n`, components in `[-1, 1)`
    pub fn embedding(&self, n: usize, dim: usize) -> Vec<f32> {
        // splitmix64 over (seed, n, component)
        let mut state = self.seed ^ (n as u64).wrapping_mul(0x9E37_79B9_7F4A_7C15);
        (0..dim)
            .map(|_| {
                state = state.wrapping_add(0x9E37_79B9_7F4A_7C15);
                let mut z = state;
                z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
                z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
                z ^= z >> 31;
                // top 24 bits give an exact f32 in [0, 1)
                ((z >> 40) as f32 / (1u64 << 24) as f32) * 2.0 - 1.0
            })
            .collect()
    }

    /// `count` `(id, embedding)` pairs of dimension `dim`
    pub fn records(&self, prefix: &str, count: usize, dim: usize) -> Vec<(String, Vec<f32>)> {
        (0..count)
            .map(|n| (self.id(prefix, n), self.embedding(n, dim)))
            .collect()
    }
}

/// Test assertion helpers
pub mod assertions {
    /// Assert that scores never increase along a ranked list
    pub fn assert_descending(scores: &[f32], context: &str) {
        for (i, pair) in scores.windows(2).enumerate() {
            assert!(
                pair[0] >= pair[1],
                "{}: score at {} ({}) is below score at {} ({})",
                context,
                i,
                pair[0],
                i + 1,
                pair[1]
            );
        }
    }

    /// Assert that two floats are within `epsilon`
    pub fn assert_close(actual: f32, expected: f32, epsilon: f32, context: &str) {
        assert!(
            (actual - expected).abs() <= epsilon,
            "{}: expected {} ± {}, got {}",
            context,
            expected,
            epsilon,
            actual
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_data_builder_deterministic() {
        let builder1 = TestDataBuilder::new(42);
        let builder2 = TestDataBuilder::new(42);

        assert_eq!(builder1.records("doc", 5, 4), builder2.records("doc", 5, 4));
    }

    #[test]
    fn test_data_builder_from_name() {
        let builder1 = TestDataBuilder::from_test_name("my_test");
        let builder2 = TestDataBuilder::from_test_name("my_test");

        assert_eq!(builder1.embedding(3, 16), builder2.embedding(3, 16));
    }

    #[test]
    fn test_data_builder_different_names() {
        let builder1 = TestDataBuilder::from_test_name("test1");
        let builder2 = TestDataBuilder::from_test_name("test2");

        // Different test names should generate different data
        assert_ne!(builder1.embedding(0, 8), builder2.embedding(0, 8));
        assert_ne!(builder1.id("doc", 0), builder2.id("doc", 0));
    }

    #[test]
    fn test_embedding_range_and_variety() {
        let builder = TestDataBuilder::new(7);
        let a = builder.embedding(0, 64);
        let b = builder.embedding(1, 64);

        assert!(a.iter().all(|x| (-1.0..1.0).contains(x)));
        assert_ne!(a, b);
    }

    #[test]
    fn test_assert_descending_accepts_ties() {
        assertions::assert_descending(&[3.0, 2.0, 2.0, -1.0], "ties");
    }

    #[test]
    #[should_panic]
    fn test_assert_descending_rejects_increase() {
        assertions::assert_descending(&[1.0, 2.0], "increase");
    }
}
