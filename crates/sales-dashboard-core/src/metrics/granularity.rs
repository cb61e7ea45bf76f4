use chrono::{Datelike, Duration, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::error::DashboardError;
use crate::types::Role;
use crate::DashboardResult;

/// Time bucket for trend charts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Granularity {
    Daily,
    Weekly,
    #[default]
    Monthly,
    Quarterly,
    Yearly,
}

pub const MANAGER_GRANULARITIES: &[Granularity] = &[
    Granularity::Daily,
    Granularity::Weekly,
    Granularity::Monthly,
    Granularity::Yearly,
];

pub const SALESPERSON_GRANULARITIES: &[Granularity] =
    &[Granularity::Monthly, Granularity::Quarterly];

pub const MARKETER_GRANULARITIES: &[Granularity] = &[
    Granularity::Daily,
    Granularity::Weekly,
    Granularity::Monthly,
];

impl Granularity {
    /// Bucket label for a date. Labels sort chronologically as plain strings.
    ///
    /// Weeks run Monday to Sunday and are labelled `start/end`.
    pub fn period_label(&self, date: NaiveDate) -> String {
        match self {
            Granularity::Daily => date.format("%Y-%m-%d").to_string(),
            Granularity::Weekly => {
                let monday = date - Duration::days(date.weekday().num_days_from_monday() as i64);
                let sunday = monday + Duration::days(6);
                format!("{}/{}", monday.format("%Y-%m-%d"), sunday.format("%Y-%m-%d"))
            }
            Granularity::Monthly => date.format("%Y-%m").to_string(),
            Granularity::Quarterly => format!("{}Q{}", date.year(), (date.month0() / 3) + 1),
            Granularity::Yearly => date.year().to_string(),
        }
    }

    /// X-axis title for charts bucketed at this granularity.
    pub fn axis_title(&self) -> &'static str {
        match self {
            Granularity::Daily => "Day",
            Granularity::Weekly => "Week",
            Granularity::Monthly => "Month",
            Granularity::Quarterly => "Quarter",
            Granularity::Yearly => "Year",
        }
    }

    /// Buckets offered to a role's trend chart.
    pub fn supported_by(role: Role) -> &'static [Granularity] {
        match role {
            Role::Manager => MANAGER_GRANULARITIES,
            Role::Salesperson => SALESPERSON_GRANULARITIES,
            Role::Marketer => MARKETER_GRANULARITIES,
        }
    }

    pub fn ensure_supported(&self, role: Role) -> DashboardResult<()> {
        if Granularity::supported_by(role).contains(self) {
            Ok(())
        } else {
            Err(DashboardError::InvalidInput {
                field: "granularity".to_string(),
                reason: format!("{:?} is not available for the {} view", self, role),
            })
        }
    }
}

impl std::str::FromStr for Granularity {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "daily" | "day" | "d" => Ok(Granularity::Daily),
            "weekly" | "week" | "w" => Ok(Granularity::Weekly),
            "monthly" | "month" | "m" => Ok(Granularity::Monthly),
            "quarterly" | "quarter" | "q" => Ok(Granularity::Quarterly),
            "yearly" | "year" | "y" => Ok(Granularity::Yearly),
            other => Err(format!("unknown granularity '{}'", other)),
        }
    }
}
