use std::collections::{BTreeMap, HashSet};
use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::distribution::event_matches;
use crate::models::{ProjectRecord, TimePoint};
use crate::normalize::parse_date;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SeriesKind {
    #[default]
    Completed,
    Indexed,
    Presented,
    AllEvents,
    Projects,
}

impl SeriesKind {
    pub const ALL: [SeriesKind; 5] = [
        SeriesKind::Completed,
        SeriesKind::Indexed,
        SeriesKind::Presented,
        SeriesKind::AllEvents,
        SeriesKind::Projects,
    ];

    pub fn label(self) -> &'static str {
        match self {
            SeriesKind::Completed => "Completed",
            SeriesKind::Indexed => "Indexed",
            SeriesKind::Presented => "Presented",
            SeriesKind::AllEvents => "All Events",
            SeriesKind::Projects => "Projects",
        }
    }

    fn keyword(self) -> Option<&'static str> {
        match self {
            SeriesKind::Completed => Some("completed"),
            SeriesKind::Indexed => Some("indexed"),
            SeriesKind::Presented => Some("presented"),
            SeriesKind::AllEvents | SeriesKind::Projects => None,
        }
    }
}

impl fmt::Display for SeriesKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for SeriesKind {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_lowercase().replace(['-', '_'], " ").as_str() {
            "completed" => Ok(SeriesKind::Completed),
            "indexed" => Ok(SeriesKind::Indexed),
            "presented" => Ok(SeriesKind::Presented),
            "events" | "all events" => Ok(SeriesKind::AllEvents),
            "projects" => Ok(SeriesKind::Projects),
            other => Err(format!("unknown series '{other}'")),
        }
    }
}

/// Per-day counts for `kind`, oldest day first. Days without activity and
/// records whose date does not parse are left out.
pub fn build_series<'a, I>(records: I, kind: SeriesKind) -> Vec<TimePoint>
where
    I: IntoIterator<Item = &'a ProjectRecord>,
{
    match kind {
        SeriesKind::Projects => distinct_projects_by_day(records),
        _ => events_by_day(records, kind.keyword()),
    }
}

fn events_by_day<'a, I>(records: I, keyword: Option<&str>) -> Vec<TimePoint>
where
    I: IntoIterator<Item = &'a ProjectRecord>,
{
    let mut days: BTreeMap<NaiveDate, usize> = BTreeMap::new();

    for record in records {
        let Some(date) = parse_date(&record.event_date) else {
            continue;
        };
        if keyword.map_or(true, |keyword| event_matches(record, keyword)) {
            *days.entry(date).or_default() += 1;
        }
    }

    days.into_iter()
        .map(|(date, count)| TimePoint { date, count })
        .collect()
}

fn distinct_projects_by_day<'a, I>(records: I) -> Vec<TimePoint>
where
    I: IntoIterator<Item = &'a ProjectRecord>,
{
    let mut days: BTreeMap<NaiveDate, HashSet<&str>> = BTreeMap::new();

    for record in records {
        if record.project_name.is_empty() {
            continue;
        }
        let Some(date) = parse_date(&record.project_start_date) else {
            continue;
        };
        days.entry(date)
            .or_default()
            .insert(record.project_name.as_str());
    }

    days.into_iter()
        .map(|(date, projects)| TimePoint {
            date,
            count: projects.len(),
        })
        .collect()
}
