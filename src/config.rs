//! Engine configuration.
//!
//! ```rust
//! use crowd_rs::CrowdConfig;
//!
//! let config = CrowdConfig::from_json(r#"{ "max_m": 3, "topic_key": "topic" }"#).unwrap();
//! assert_eq!(config.max_m, 3);
//! assert_eq!(config.max_k, 5);
//! ```

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Parameter ranges for the metric engine.
///
/// `S` searches `m` in `[min_m, max_m]` and `k` in `[min_k, max_k]`;
/// `h_measure` searches `h` in `[1, max_h]`. Topics are read from the node
/// attribute named `topic_key`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CrowdConfig {
    pub min_k: usize,
    pub max_k: usize,
    pub min_m: usize,
    pub max_m: usize,
    pub max_h: usize,
    pub topic_key: String,
}

impl Default for CrowdConfig {
    fn default() -> Self {
        Self {
            min_k: 2,
            max_k: 5,
            min_m: 1,
            max_m: 5,
            max_h: 6,
            topic_key: "T".to_string(),
        }
    }
}

impl CrowdConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_k_range(mut self, min_k: usize, max_k: usize) -> Self {
        self.min_k = min_k;
        self.max_k = max_k;
        self
    }

    pub fn with_m_range(mut self, min_m: usize, max_m: usize) -> Self {
        self.min_m = min_m;
        self.max_m = max_m;
        self
    }

    pub fn with_max_h(mut self, max_h: usize) -> Self {
        self.max_h = max_h;
        self
    }

    pub fn with_topic_key(mut self, key: impl Into<String>) -> Self {
        self.topic_key = key.into();
        self
    }

    /// Parse a JSON document and validate it. Absent fields take defaults.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: CrowdConfig = serde_json::from_str(json)
            .map_err(|e| Error::InvalidConfig(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Reject ranges that make the observer predicate ill-defined.
    pub fn validate(&self) -> Result<()> {
        if self.min_m < 1 {
            return Err(Error::InvalidConfig("min_m must be at least 1".into()));
        }
        if self.min_k < 1 {
            return Err(Error::InvalidConfig("min_k must be at least 1".into()));
        }
        if self.min_m > self.max_m {
            return Err(Error::InvalidConfig(format!(
                "empty m range: min_m {} > max_m {}",
                self.min_m, self.max_m
            )));
        }
        if self.min_k > self.max_k {
            return Err(Error::InvalidConfig(format!(
                "empty k range: min_k {} > max_k {}",
                self.min_k, self.max_k
            )));
        }
        if self.max_h < 1 {
            return Err(Error::InvalidConfig("max_h must be at least 1".into()));
        }
        if self.topic_key.is_empty() {
            return Err(Error::InvalidConfig("topic_key must not be empty".into()));
        }
        Ok(())
    }

    /// Every `(m, k)` pair `S` tries, strongest first.
    ///
    /// Ordered by descending `(m * k, m, k)`.
    pub fn mk_candidates(&self) -> Vec<(usize, usize)> {
        let mut pairs: Vec<(usize, usize, usize)> = (self.min_m..=self.max_m)
            .flat_map(|m| (self.min_k..=self.max_k).map(move |k| (m * k, m, k)))
            .collect();
        pairs.sort_unstable_by(|a, b| b.cmp(a));
        pairs.into_iter().map(|(_, m, k)| (m, k)).collect()
    }
}
