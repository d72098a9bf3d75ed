//! PageSpeed Insights report model.
//!
//! Only the fields the batch report reads are modelled; everything else in
//! the API response is ignored on deserialization.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// A PageSpeed Insights v5 response.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageSpeedReport {
    /// Final URL after redirects.
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub loading_experience: Option<LoadingExperience>,
    #[serde(default)]
    pub lighthouse_result: Option<LighthouseResult>,
}

/// Field data from the Chrome UX Report.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LoadingExperience {
    #[serde(default)]
    pub metrics: BTreeMap<String, FieldMetric>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldMetric {
    /// FAST, AVERAGE, SLOW or NONE.
    pub category: String,
    pub percentile: f64,
}

/// Lab data from the Lighthouse run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LighthouseResult {
    #[serde(default)]
    pub final_url: Option<String>,
    #[serde(default)]
    pub fetch_time: Option<String>,
    #[serde(default)]
    pub categories: Categories,
    #[serde(default)]
    pub audits: BTreeMap<String, Audit>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Categories {
    #[serde(default)]
    pub performance: Option<CategoryScore>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CategoryScore {
    /// 0.0 to 1.0; the API sends `null` when the run errored.
    #[serde(default)]
    pub score: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Audit {
    #[serde(default)]
    pub score: Option<f64>,
    #[serde(default)]
    pub display_value: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
}

/// A named field metric flattened for reporting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LoadingMetric {
    pub name: String,
    pub value: String,
    pub category: String,
}

impl PageSpeedReport {
    /// Lighthouse performance score, `0.0` when absent.
    pub fn performance_score(&self) -> f64 {
        self.lighthouse_result
            .as_ref()
            .and_then(|lh| lh.categories.performance.as_ref())
            .and_then(|perf| perf.score)
            .unwrap_or(0.0)
    }

    /// Field metrics, sorted by name.
    pub fn loading_metrics(&self) -> Vec<LoadingMetric> {
        self.loading_experience
            .as_ref()
            .map(|le| {
                le.metrics
                    .iter()
                    .map(|(name, data)| LoadingMetric {
                        name: name.clone(),
                        value: data.percentile.to_string(),
                        category: data.category.clone(),
                    })
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Report carrying only a performance score.
    pub fn with_performance_score(score: f64) -> Self {
        Self {
            lighthouse_result: Some(LighthouseResult {
                categories: Categories {
                    performance: Some(CategoryScore { score: Some(score) }),
                },
                ..Default::default()
            }),
            ..Default::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"{
        "id": "https://example.com/",
        "loadingExperience": {
            "metrics": {
                "LARGEST_CONTENTFUL_PAINT_MS": {"category": "FAST", "percentile": 1800},
                "CUMULATIVE_LAYOUT_SHIFT_SCORE": {"category": "AVERAGE", "percentile": 12,
                    "distributions": []}
            },
            "overall_category": "FAST"
        },
        "lighthouseResult": {
            "finalUrl": "https://example.com/",
            "fetchTime": "2024-05-01T10:00:00.000Z",
            "categories": {"performance": {"id": "performance", "score": 0.87}},
            "audits": {
                "speed-index": {"score": 0.9, "displayValue": "1.2 s", "title": "Speed Index"}
            }
        }
    }"#;

    #[test]
    fn test_deserialize_and_read_score() {
        let report: PageSpeedReport = serde_json::from_str(SAMPLE).unwrap();
        assert_eq!(report.id, "https://example.com/");
        assert!((report.performance_score() - 0.87).abs() < f64::EPSILON);
        let lh = report.lighthouse_result.as_ref().unwrap();
        assert_eq!(lh.audits["speed-index"].display_value.as_deref(), Some("1.2 s"));
    }

    #[test]
    fn test_loading_metrics() {
        let report: PageSpeedReport = serde_json::from_str(SAMPLE).unwrap();
        assert_eq!(
            report.loading_metrics(),
            vec![
                LoadingMetric {
                    name: "CUMULATIVE_LAYOUT_SHIFT_SCORE".to_string(),
                    value: "12".to_string(),
                    category: "AVERAGE".to_string(),
                },
                LoadingMetric {
                    name: "LARGEST_CONTENTFUL_PAINT_MS".to_string(),
                    value: "1800".to_string(),
                    category: "FAST".to_string(),
                },
            ]
        );
    }

    #[test]
    fn test_missing_sections_default_to_zero() {
        let report: PageSpeedReport = serde_json::from_str(r#"{"id": "x"}"#).unwrap();
        assert_eq!(report.performance_score(), 0.0);
        assert!(report.loading_metrics().is_empty());

        let null_score: PageSpeedReport = serde_json::from_str(
            r#"{"lighthouseResult": {"categories": {"performance": {"score": null}}}}"#,
        )
        .unwrap();
        assert_eq!(null_score.performance_score(), 0.0);
    }

    #[test]
    fn test_with_performance_score() {
        assert_eq!(
            PageSpeedReport::with_performance_score(0.5).performance_score(),
            0.5
        );
    }
}
