use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use sf_views::dashboard::DashboardConfig;
use sf_views::{PageSize, SortKey, TopKConfig};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase", deny_unknown_fields)]
pub struct ReportConfig {
    pub page_size: PageSize,
    pub sort: Option<SortKey>,
    pub chart_days: u32,
    pub top_products: usize,
    pub top_customers: usize,
    pub recent_orders: usize,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            page_size: PageSize::Rows(10),
            sort: None,
            chart_days: 7,
            top_products: 5,
            top_customers: 5,
            recent_orders: 5,
        }
    }
}

impl ReportConfig {
    /// Read a JSON config file; absent keys keep their defaults.
    pub fn from_file(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        serde_json::from_str(&raw).with_context(|| format!("parsing config {}", path.display()))
    }

    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::from_file(path),
            None => Ok(Self::default()),
        }
    }

    pub fn dashboard(&self) -> DashboardConfig {
        DashboardConfig {
            chart_days: self.chart_days,
            top_products: TopKConfig { k: self.top_products },
            top_customers: TopKConfig { k: self.top_customers },
            recent_orders: TopKConfig { k: self.recent_orders },
        }
    }
}
