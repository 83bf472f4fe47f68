//! Colony health report.
//!
//! Findings from every subsystem (resource reports, mood reports, and
//! host-supplied checks such as power or defense) are merged into one
//! verdict, a summary line, the critical alerts, and a bounded list of
//! recommendations ordered by severity.

use cw_common::Band;
use cw_config::HealthConfig;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::forecast::{aggregate, OverallStatus, SubsystemStatus};

/// One subsystem's classified state with its human-readable advice.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct SubsystemFinding {
    pub subsystem: String,
    pub band: Band,
    #[serde(default)]
    pub issues: Vec<String>,
    #[serde(default)]
    pub recommendations: Vec<String>,
}

impl SubsystemFinding {
    pub fn new(subsystem: impl Into<String>, band: Band) -> Self {
        SubsystemFinding {
            subsystem: subsystem.into(),
            band,
            issues: Vec::new(),
            recommendations: Vec::new(),
        }
    }

    pub fn with_issue(mut self, issue: impl Into<String>) -> Self {
        self.issues.push(issue.into());
        self
    }

    pub fn with_recommendation(mut self, recommendation: impl Into<String>) -> Self {
        self.recommendations.push(recommendation.into());
        self
    }

    fn status(&self) -> SubsystemStatus {
        SubsystemStatus::new(self.subsystem.clone(), self.band)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct HealthReport {
    pub overall: OverallStatus,
    pub summary: String,
    pub systems: Vec<SubsystemFinding>,
    pub critical_alerts: Vec<String>,
    pub top_recommendations: Vec<String>,
}

impl HealthReport {
    pub fn has_critical(&self) -> bool {
        self.overall.band == Band::Critical
    }

    /// Anything worse than stable.
    pub fn has_warnings(&self) -> bool {
        self.overall.band > Band::Stable
    }
}

/// Build the colony report from subsystem findings, in input order.
pub fn build_health_report(findings: Vec<SubsystemFinding>, config: &HealthConfig) -> HealthReport {
    let statuses: Vec<SubsystemStatus> = findings.iter().map(SubsystemFinding::status).collect();
    let overall = aggregate(&statuses, config.policy);

    let critical_alerts: Vec<String> = findings
        .iter()
        .filter(|f| f.band == Band::Critical)
        .flat_map(|f| {
            if f.issues.is_empty() {
                vec![format!("{} is critical", f.subsystem)]
            } else {
                f.issues.clone()
            }
        })
        .collect();

    let top_recommendations = prioritize(&findings, config.top_recommendations);
    let summary = summarize(overall.band, critical_alerts.len());

    HealthReport {
        overall,
        summary,
        systems: findings,
        critical_alerts,
        top_recommendations,
    }
}

/// Most severe findings first; ties keep input order. Duplicates are dropped.
fn prioritize(findings: &[SubsystemFinding], limit: usize) -> Vec<String> {
    let mut ordered: Vec<&SubsystemFinding> = findings.iter().collect();
    ordered.sort_by_key(|f| f.band.rank());

    let mut seen = HashSet::new();
    ordered
        .into_iter()
        .flat_map(|f| f.recommendations.iter())
        .filter(|rec| seen.insert(rec.as_str()))
        .take(limit)
        .cloned()
        .collect()
}

fn summarize(band: Band, critical_count: usize) -> String {
    match band {
        Band::Critical => format!(
            "Colony in CRITICAL condition - {} urgent issue(s) require immediate attention!",
            critical_count
        ),
        Band::High | Band::Warning => {
            "Colony stable but facing challenges - address warnings before they become critical"
                .to_string()
        }
        Band::Medium | Band::Low | Band::Stable => {
            "Colony functioning adequately with room for improvement".to_string()
        }
        Band::Healthy => "Colony in good health - all systems functioning well".to_string(),
    }
}
