use std::collections::HashSet;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::models::{ClientMetricRecord, ProjectRecord};
use crate::normalize::{
    contains_ignore_case, float_or_zero, int_or_zero, is_canonical_project_type,
    normalize_project_type, parse_date,
};

/// Selection that the option lists use to mean "no project type constraint".
pub const ALL_TYPES: &str = "All";

const CANONICAL_TYPE_LABELS: [&str; 2] = ["Reticula", "Inex One"];

/// Inclusive calendar-day bounds over Project Start Date.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default)]
pub struct DateRange {
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
}

impl DateRange {
    pub fn is_active(&self) -> bool {
        self.start.is_some() || self.end.is_some()
    }

    /// A record date that does not parse is never excluded by the range.
    pub fn admits(&self, raw_date: &str) -> bool {
        if !self.is_active() {
            return true;
        }
        let Some(date) = parse_date(raw_date) else {
            return true;
        };
        if self.start.is_some_and(|start| date < start) {
            return false;
        }
        if self.end.is_some_and(|end| date > end) {
            return false;
        }
        true
    }
}

/// Constraints of the project dashboard, also used verbatim as a comparison
/// condition. `None` or an empty string leaves a dimension unconstrained.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectFilter {
    pub project_type: Option<String>,
    pub project_manager: Option<String>,
    pub client_name: Option<String>,
    pub geoscope: Option<String>,
    pub industry: Option<String>,
    pub event_type: Option<String>,
    pub event_executor_associate: Option<String>,
    pub expert_terms_state: Option<String>,
    pub date_range: DateRange,
}

impl ProjectFilter {
    pub fn is_empty(&self) -> bool {
        project_type_selection(&self.project_type).is_none()
            && selection(&self.project_manager).is_none()
            && selection(&self.client_name).is_none()
            && selection(&self.geoscope).is_none()
            && selection(&self.industry).is_none()
            && selection(&self.event_type).is_none()
            && selection(&self.event_executor_associate).is_none()
            && selection(&self.expert_terms_state).is_none()
            && !self.date_range.is_active()
    }

    pub fn matches(&self, record: &ProjectRecord) -> bool {
        self.matches_ignoring_client(record) && exact(&self.client_name, &record.client_name)
    }

    /// Every constraint except Client Name. The Client Name option list is
    /// built from this so the selection never narrows its own choices.
    pub fn matches_ignoring_client(&self, record: &ProjectRecord) -> bool {
        if let Some(selected) = project_type_selection(&self.project_type) {
            if normalize_project_type(&record.project_type) != normalize_project_type(selected) {
                return false;
            }
        }

        exact(&self.project_manager, &record.project_manager)
            && exact(&self.geoscope, &record.geoscope)
            && exact(&self.industry, &record.industry)
            && exact(&self.event_type, &record.event_type)
            && exact(&self.event_executor_associate, &record.event_executor_associate)
            && exact(&self.expert_terms_state, &record.expert_terms_state)
            && self.date_range.admits(&record.project_start_date)
    }
}

pub fn filter_projects<'a>(
    records: &'a [ProjectRecord],
    filter: &ProjectFilter,
) -> Vec<&'a ProjectRecord> {
    records.iter().filter(|record| filter.matches(record)).collect()
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ProjectFilterOptions {
    pub project_types: Vec<String>,
    pub project_managers: Vec<String>,
    pub client_names: Vec<String>,
    pub geoscopes: Vec<String>,
    pub industries: Vec<String>,
    pub event_types: Vec<String>,
    pub event_executor_associates: Vec<String>,
    pub expert_terms_states: Vec<String>,
}

/// Option lists in first-seen order. Client names come from the records
/// that pass every other active constraint.
pub fn project_filter_options(
    records: &[ProjectRecord],
    filter: &ProjectFilter,
) -> ProjectFilterOptions {
    let mut project_types: Vec<String> =
        CANONICAL_TYPE_LABELS.iter().map(|label| label.to_string()).collect();
    project_types.extend(
        distinct_values(records.iter().map(|record| record.project_type.as_str()))
            .into_iter()
            .filter(|value| !is_canonical_project_type(value)),
    );

    ProjectFilterOptions {
        project_types,
        project_managers: distinct_values(records.iter().map(|r| r.project_manager.as_str())),
        client_names: distinct_values(
            records
                .iter()
                .filter(|record| filter.matches_ignoring_client(record))
                .map(|record| record.client_name.as_str()),
        ),
        geoscopes: distinct_values(records.iter().map(|r| r.geoscope.as_str())),
        industries: distinct_values(records.iter().map(|r| r.industry.as_str())),
        event_types: distinct_values(records.iter().map(|r| r.event_type.as_str())),
        event_executor_associates: distinct_values(
            records.iter().map(|r| r.event_executor_associate.as_str()),
        ),
        expert_terms_states: distinct_values(
            records.iter().map(|r| r.expert_terms_state.as_str()),
        ),
    }
}

/// Constraints of the client-metrics dashboard.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientMetricFilter {
    /// Case-insensitive substring of Client Name.
    pub client_name: Option<String>,
    pub min_rate: Option<f64>,
    pub max_rate: Option<f64>,
    pub min_reticula_calls: Option<i64>,
    pub max_reticula_calls: Option<i64>,
    pub min_inex_one_expected: Option<i64>,
    pub max_inex_one_expected: Option<i64>,
    pub min_inex_one_completed: Option<i64>,
    pub max_inex_one_completed: Option<i64>,
}

impl ClientMetricFilter {
    pub fn matches(&self, record: &ClientMetricRecord) -> bool {
        if let Some(term) = selection(&self.client_name) {
            if !contains_ignore_case(&record.client_name, term) {
                return false;
            }
        }

        let rate = float_or_zero(&record.rate);
        within(rate, self.min_rate, self.max_rate)
            && within(
                int_or_zero(&record.reticula_completed),
                self.min_reticula_calls,
                self.max_reticula_calls,
            )
            && within(
                int_or_zero(&record.inex_one_expected),
                self.min_inex_one_expected,
                self.max_inex_one_expected,
            )
            && within(
                int_or_zero(&record.inex_one_completed),
                self.min_inex_one_completed,
                self.max_inex_one_completed,
            )
    }
}

pub fn filter_client_metrics<'a>(
    records: &'a [ClientMetricRecord],
    filter: &ClientMetricFilter,
) -> Vec<&'a ClientMetricRecord> {
    records.iter().filter(|record| filter.matches(record)).collect()
}

/// Distinct non-empty client names, sorted.
pub fn client_metric_name_options(records: &[ClientMetricRecord]) -> Vec<String> {
    let mut names = distinct_values(records.iter().map(|record| record.client_name.as_str()));
    names.sort();
    names
}

/// Distinct non-empty values in first-seen order.
pub fn distinct_values<'a, I>(values: I) -> Vec<String>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut seen = HashSet::new();
    values
        .into_iter()
        .filter(|value| !value.is_empty() && seen.insert(*value))
        .map(str::to_string)
        .collect()
}

fn selection(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.is_empty())
}

fn project_type_selection(value: &Option<String>) -> Option<&str> {
    selection(value).filter(|v| *v != ALL_TYPES)
}

fn exact(selected: &Option<String>, actual: &str) -> bool {
    selection(selected).map_or(true, |wanted| wanted == actual)
}

fn within<T: PartialOrd + Copy>(value: T, min: Option<T>, max: Option<T>) -> bool {
    if min.is_some_and(|min| value < min) {
        return false;
    }
    if max.is_some_and(|max| value > max) {
        return false;
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{client, project};

    #[test]
    fn empty_filter_keeps_everything() {
        let records = vec![
            project("Alpha", "Acme", "Reticula"),
            project("Beta", "", ""),
        ];
        let filter = ProjectFilter::default();
        assert!(filter.is_empty());
        assert_eq!(filter_projects(&records, &filter).len(), 2);
    }

    #[test]
    fn project_type_matches_through_normalization() {
        let records = vec![
            project("Alpha", "Acme", "inex.one"),
            project("Beta", "Acme", "Inex One"),
            project("Gamma", "Acme", "Reticula"),
        ];
        let filter = ProjectFilter {
            project_type: Some("Inex One".to_string()),
            ..ProjectFilter::default()
        };
        let names: Vec<&str> = filter_projects(&records, &filter)
            .iter()
            .map(|r| r.project_name.as_str())
            .collect();
        assert_eq!(names, vec!["Alpha", "Beta"]);
    }

    #[test]
    fn all_type_selection_is_unconstrained() {
        let records = vec![project("Alpha", "Acme", "Survey")];
        let filter = ProjectFilter {
            project_type: Some(ALL_TYPES.to_string()),
            ..ProjectFilter::default()
        };
        assert!(filter.is_empty());
        assert_eq!(filter_projects(&records, &filter).len(), 1);
    }

    #[test]
    fn constraints_are_conjunctive() {
        let mut in_emea = project("Alpha", "Acme", "Reticula");
        in_emea.geoscope = "EMEA".to_string();
        in_emea.project_manager = "Dana".to_string();
        let mut other_manager = in_emea.clone();
        other_manager.project_manager = "Rui".to_string();
        let mut empty_geo = in_emea.clone();
        empty_geo.geoscope = String::new();

        let records = vec![in_emea, other_manager, empty_geo];
        let filter = ProjectFilter {
            geoscope: Some("EMEA".to_string()),
            project_manager: Some("Dana".to_string()),
            ..ProjectFilter::default()
        };
        let matched = filter_projects(&records, &filter);
        assert_eq!(matched.len(), 1);
        assert_eq!(matched[0].project_manager, "Dana");
        assert_eq!(matched[0].geoscope, "EMEA");
    }

    #[test]
    fn date_range_bounds_are_inclusive() {
        let mut records = Vec::new();
        for (name, date) in [
            ("early", "2024-01-01"),
            ("start", "2024-02-01"),
            ("end", "2024-02-29"),
            ("late", "2024-03-01"),
            ("undated", "not a date"),
        ] {
            let mut record = project(name, "Acme", "Reticula");
            record.project_start_date = date.to_string();
            records.push(record);
        }

        let filter = ProjectFilter {
            date_range: DateRange {
                start: NaiveDate::from_ymd_opt(2024, 2, 1),
                end: NaiveDate::from_ymd_opt(2024, 2, 29),
            },
            ..ProjectFilter::default()
        };
        let names: Vec<&str> = filter_projects(&records, &filter)
            .iter()
            .map(|r| r.project_name.as_str())
            .collect();
        assert_eq!(names, vec!["start", "end", "undated"]);
    }

    #[test]
    fn client_options_ignore_their_own_selection() {
        let mut alpha = project("Alpha", "Acme", "Reticula");
        alpha.project_manager = "Dana".to_string();
        let mut beta = project("Beta", "Globex", "Reticula");
        beta.project_manager = "Dana".to_string();
        let mut gamma = project("Gamma", "Initech", "Reticula");
        gamma.project_manager = "Rui".to_string();
        let records = vec![alpha, beta, gamma];

        let filter = ProjectFilter {
            project_manager: Some("Dana".to_string()),
            client_name: Some("Acme".to_string()),
            ..ProjectFilter::default()
        };
        let options = project_filter_options(&records, &filter);
        assert_eq!(options.client_names, vec!["Acme", "Globex"]);
        assert_eq!(options.project_managers, vec!["Dana", "Rui"]);
    }

    #[test]
    fn project_type_options_keep_canonical_entries_first() {
        let records = vec![
            project("A", "Acme", "inex.one"),
            project("B", "Acme", "Survey"),
            project("C", "Acme", "survey"),
            project("D", "Acme", "RETICULA"),
            project("E", "Acme", "Survey"),
            project("F", "Acme", ""),
        ];
        let options = project_filter_options(&records, &ProjectFilter::default());
        assert_eq!(
            options.project_types,
            vec!["Reticula", "Inex One", "Survey", "survey"]
        );
    }

    #[test]
    fn client_metric_filter_uses_substring_and_ranges() {
        let records = vec![
            client("Acme Corp", "10", "20", "5"),
            client("Globex", "50", "40", "25"),
            client("acme labs", "0", "10", "abc"),
        ];

        let by_name = ClientMetricFilter {
            client_name: Some("ACME".to_string()),
            ..ClientMetricFilter::default()
        };
        assert_eq!(filter_client_metrics(&records, &by_name).len(), 2);

        let by_completed = ClientMetricFilter {
            max_inex_one_completed: Some(5),
            ..ClientMetricFilter::default()
        };
        let names: Vec<&str> = filter_client_metrics(&records, &by_completed)
            .iter()
            .map(|r| r.client_name.as_str())
            .collect();
        assert_eq!(names, vec!["Acme Corp", "acme labs"]);

        let by_rate = ClientMetricFilter {
            min_rate: Some(100.0),
            max_rate: Some(250.0),
            ..ClientMetricFilter::default()
        };
        assert_eq!(filter_client_metrics(&records, &by_rate).len(), 2);
    }

    #[test]
    fn client_name_options_are_sorted() {
        let records = vec![
            client("Globex", "1", "1", "1"),
            client("Acme", "1", "1", "1"),
            client("", "1", "1", "1"),
            client("Globex", "1", "1", "1"),
        ];
        assert_eq!(client_metric_name_options(&records), vec!["Acme", "Globex"]);
    }
}
