// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

fn default_limit() -> usize {
    10
}

/// Recommendation tuning, read once and handed to the engine by value.
///
/// `brand_rules` maps a brand to the ordered set of brands worth showing
/// alongside it, e.g. `{"Nike": ["Nike", "Adidas"]}`. A brand without a
/// rule recommends within itself only.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecommendConfig {
    #[serde(default = "default_limit")]
    pub top_seller_limit: usize,
    #[serde(default = "default_limit")]
    pub rule_based_limit: usize,
    #[serde(default)]
    pub brand_rules: HashMap<String, Vec<String>>,
}

impl Default for RecommendConfig {
    fn default() -> Self {
        RecommendConfig {
            top_seller_limit: default_limit(),
            rule_based_limit: default_limit(),
            brand_rules: HashMap::new(),
        }
    }
}

pub fn config_path() -> Result<PathBuf> {
    let proj = ProjectDirs::from("com.alphavelocity", "Shopkeep", "shopkeep")
        .context("Could not determine platform-specific data dir")?;
    Ok(proj.data_dir().join("recommend.json"))
}

impl RecommendConfig {
    /// Read a config file, or defaults when the file does not exist.
    pub fn load(path: Option<&Path>) -> Result<RecommendConfig> {
        let path = match path {
            Some(p) => p.to_path_buf(),
            None => config_path()?,
        };
        if !path.exists() {
            return Ok(RecommendConfig::default());
        }
        let raw = fs::read_to_string(&path)
            .with_context(|| format!("Read config {}", path.display()))?;
        let cfg: RecommendConfig = serde_json::from_str(&raw)
            .with_context(|| format!("Parse config {}", path.display()))?;
        Ok(cfg)
    }
}
