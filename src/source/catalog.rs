//! Algorithm catalog client
//!
//! Every catalog response is a `{"success": bool, ...}` envelope. The
//! member holding the payload differs per route (`algorithms`, `algorithm`,
//! `example`, `categories`), so each route gets a small wrapper struct.

use super::http::ApiClient;
use super::remote::TraceRequest;
use super::SourceError;
use crate::model::Interval;
use crate::trace::{ServiceDocument, Trace};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// Big-O summary reported for an algorithm
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Complexity {
    #[serde(default = "unknown")]
    pub time: String,
    #[serde(default = "unknown")]
    pub space: String,
}

impl Default for Complexity {
    fn default() -> Self {
        Complexity {
            time: unknown(),
            space: unknown(),
        }
    }
}

fn unknown() -> String {
    "Unknown".to_string()
}

/// Catalog entry describing one algorithm
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlgorithmInfo {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub difficulty: Option<String>,
    #[serde(default)]
    pub complexity: Complexity,
    #[serde(default)]
    pub tags: Vec<String>,
}

impl fmt::Display for AlgorithmInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name, self.id)?;
        if !self.category.is_empty() {
            write!(f, " [{}]", self.category)?;
        }
        write!(
            f,
            " time {} / space {}",
            self.complexity.time, self.complexity.space
        )
    }
}

/// Group `algorithms` under `categories`, in the service's category order.
///
/// Categories with no algorithms are dropped. Algorithms whose category the
/// service did not list follow at the end, grouped by their own category.
pub fn group_by_category(
    categories: &[String],
    algorithms: Vec<AlgorithmInfo>,
) -> Vec<(String, Vec<AlgorithmInfo>)> {
    let mut groups: Vec<(String, Vec<AlgorithmInfo>)> = categories
        .iter()
        .map(|category| (category.clone(), Vec::new()))
        .collect();

    for info in algorithms {
        let category = if info.category.is_empty() {
            unknown()
        } else {
            info.category.clone()
        };
        match groups.iter_mut().find(|(name, _)| *name == category) {
            Some((_, members)) => members.push(info),
            None => groups.push((category, vec![info])),
        }
    }

    groups.retain(|(_, members)| !members.is_empty());
    groups
}

#[derive(Deserialize)]
struct AlgorithmList {
    algorithms: Vec<AlgorithmInfo>,
}

#[derive(Deserialize)]
struct AlgorithmEntry {
    algorithm: AlgorithmInfo,
}

#[derive(Deserialize)]
struct CategoryList {
    categories: Vec<String>,
}

#[derive(Deserialize)]
struct ExampleEntry {
    example: ExampleInput,
}

#[derive(Deserialize)]
struct ExampleInput {
    intervals: Vec<Interval>,
}

#[derive(Debug, Clone)]
pub struct CatalogClient {
    api: ApiClient,
}

impl CatalogClient {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, SourceError> {
        Ok(Self {
            api: ApiClient::new(base_url, timeout)?,
        })
    }

    pub async fn list_algorithms(&self) -> Result<Vec<AlgorithmInfo>, SourceError> {
        let list: AlgorithmList = self.api.get("algorithms").await?;
        Ok(list.algorithms)
    }

    pub async fn categories(&self) -> Result<Vec<String>, SourceError> {
        let list: CategoryList = self.api.get("algorithms/categories").await?;
        Ok(list.categories)
    }

    pub async fn algorithm(&self, id: &str) -> Result<AlgorithmInfo, SourceError> {
        let entry: AlgorithmEntry = self.api.get(&format!("algorithm/{id}")).await?;
        Ok(entry.algorithm)
    }

    /// Input the service suggests for `id`
    pub async fn default_example(&self, id: &str) -> Result<Vec<Interval>, SourceError> {
        let entry: ExampleEntry = self.api.get(&format!("algorithm/{id}/example")).await?;
        Ok(entry.example.intervals)
    }

    pub async fn trace(&self, id: &str, intervals: &[Interval]) -> Result<Trace, SourceError> {
        let document: ServiceDocument = self
            .api
            .post(&format!("algorithm/{id}/trace"), &TraceRequest { intervals })
            .await?;
        Ok(document.into_trace()?)
    }
}
