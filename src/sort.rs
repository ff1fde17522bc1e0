use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use crate::models::{ClientMetricField, ClientMetricRecord, ProjectField, ProjectRecord};
use crate::normalize::parse_float;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortDirection {
    #[default]
    Ascending,
    Descending,
}

impl SortDirection {
    pub fn apply(self, ordering: Ordering) -> Ordering {
        match self {
            SortDirection::Ascending => ordering,
            SortDirection::Descending => ordering.reverse(),
        }
    }

    pub fn reversed(self) -> Self {
        match self {
            SortDirection::Ascending => SortDirection::Descending,
            SortDirection::Descending => SortDirection::Ascending,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SortState<F> {
    pub field: F,
    pub direction: SortDirection,
}

impl<F: Copy + PartialEq> SortState<F> {
    pub fn new(field: F, direction: SortDirection) -> Self {
        Self { field, direction }
    }

    /// Clicking the active ascending column flips it; anything else starts
    /// ascending on the chosen column.
    pub fn toggled(self, field: F) -> Self {
        if self.field == field && self.direction == SortDirection::Ascending {
            Self::new(field, SortDirection::Descending)
        } else {
            Self::new(field, SortDirection::Ascending)
        }
    }
}

pub type ProjectSort = SortState<ProjectField>;
pub type ClientMetricSort = SortState<ClientMetricField>;

impl Default for SortState<ProjectField> {
    fn default() -> Self {
        Self::new(ProjectField::ProjectName, SortDirection::Ascending)
    }
}

impl Default for SortState<ClientMetricField> {
    fn default() -> Self {
        Self::new(ClientMetricField::ClientName, SortDirection::Ascending)
    }
}

/// Case-insensitive ordering with lower case ahead of upper case on ties,
/// close to what a default-locale collator produces for plain ASCII text.
/// This is not a collator: accented letters order by code point after the
/// whole ASCII range, and punctuation keeps its code point position instead
/// of being ignored.
pub fn compare_text(a: &str, b: &str) -> Ordering {
    a.to_lowercase()
        .cmp(&b.to_lowercase())
        .then_with(|| b.cmp(a))
}

/// Values that do not parse become NaN and order after every number.
pub fn compare_numeric(a: &str, b: &str) -> Ordering {
    let a = parse_float(a).unwrap_or(f64::NAN);
    let b = parse_float(b).unwrap_or(f64::NAN);
    a.total_cmp(&b)
}

pub fn sort_client_metrics(records: &mut [&ClientMetricRecord], sort: &ClientMetricSort) {
    let field = sort.field;
    records.sort_by(|a, b| {
        let ordering = if field.is_numeric() {
            compare_numeric(field.value(a), field.value(b))
        } else {
            compare_text(field.value(a), field.value(b))
        };
        sort.direction.apply(ordering)
    });
}

pub fn sort_projects(records: &mut [&ProjectRecord], sort: &ProjectSort) {
    let field = sort.field;
    records.sort_by(|a, b| sort.direction.apply(compare_text(field.value(a), field.value(b))));
}
