//! Packaging metric bundles into ordered, renderer-agnostic report sections.

pub mod chart;
pub mod compose;
pub mod dashboard;
pub mod format;

use serde::{Deserialize, Serialize};

use crate::types::{DateRange, Role};

pub use chart::{ChartData, ChartLayout, ChartSpec, ChartType, TargetLine};
pub use compose::compose_report;
pub use dashboard::{build_dashboard, DashboardRequest, DashboardView};

/// What a section shows.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SectionBody {
    /// Headline number, optionally with a supporting figure
    Kpi {
        value: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        detail: Option<String>,
    },
    Chart(ChartSpec),
    /// Shown in place of a chart with no data
    Placeholder { message: String },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportSection {
    pub title: String,
    pub body: SectionBody,
}

impl ReportSection {
    pub fn kpi(title: &str, value: impl Into<String>) -> Self {
        ReportSection {
            title: title.to_string(),
            body: SectionBody::Kpi {
                value: value.into(),
                detail: None,
            },
        }
    }

    pub fn kpi_with_detail(title: &str, value: impl Into<String>, detail: impl Into<String>) -> Self {
        ReportSection {
            title: title.to_string(),
            body: SectionBody::Kpi {
                value: value.into(),
                detail: Some(detail.into()),
            },
        }
    }

    /// A chart section, or the placeholder message when the chart has no data.
    pub fn chart_or(title: &str, spec: ChartSpec, empty_message: &str) -> Self {
        let body = if spec.is_empty() {
            SectionBody::Placeholder {
                message: empty_message.to_string(),
            }
        } else {
            SectionBody::Chart(spec)
        };
        ReportSection {
            title: title.to_string(),
            body,
        }
    }

    pub fn is_kpi(&self) -> bool {
        matches!(self.body, SectionBody::Kpi { .. })
    }

    /// `Title: value` or `Title: value (detail)`.
    pub fn kpi_line(&self) -> Option<String> {
        match &self.body {
            SectionBody::Kpi {
                value,
                detail: Some(d),
            } => Some(format!("{}: {} ({})", self.title, value, d)),
            SectionBody::Kpi { value, detail: None } => Some(format!("{}: {}", self.title, value)),
            _ => None,
        }
    }
}

/// A composed report for one role and date range.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Report {
    pub role: Role,
    pub title: String,
    pub date_range: DateRange,
    pub sections: Vec<ReportSection>,
}

impl Report {
    /// KPI text exactly as every renderer prints it.
    pub fn kpi_lines(&self) -> Vec<String> {
        self.sections.iter().filter_map(ReportSection::kpi_line).collect()
    }

    /// Chart and placeholder sections, in order.
    pub fn visual_sections(&self) -> impl Iterator<Item = &ReportSection> {
        self.sections.iter().filter(|s| !s.is_kpi())
    }

    pub fn section(&self, title: &str) -> Option<&ReportSection> {
        self.sections.iter().find(|s| s.title == title)
    }
}
