use std::collections::HashSet;

use crate::models::{ClientMetricRecord, ClientMetricsSummary, ProjectRecord, ProjectSummary};
use crate::normalize::{contains_ignore_case, float_or_zero, int_or_zero, to_fixed};

pub fn is_completed(record: &ProjectRecord) -> bool {
    contains_ignore_case(&record.expert_interaction_state, "completed")
}

/// `part / whole * 100` with one decimal, or `"0"` when `whole` is zero.
pub fn percentage_label(part: f64, whole: f64) -> String {
    if whole == 0.0 {
        "0".to_string()
    } else {
        to_fixed(part / whole * 100.0, 1)
    }
}

pub fn project_summary<'a, I>(records: I) -> ProjectSummary
where
    I: IntoIterator<Item = &'a ProjectRecord>,
{
    let mut total_projects = 0;
    let mut completed_projects = 0;
    let mut clients = HashSet::new();
    let mut experts = HashSet::new();

    for record in records {
        total_projects += 1;
        clients.insert(record.client_name.as_str());
        experts.insert(record.expert_name.as_str());
        if is_completed(record) {
            completed_projects += 1;
        }
    }

    ProjectSummary {
        total_projects,
        unique_clients: clients.len(),
        unique_experts: experts.len(),
        completed_projects,
        completed_rate: percentage_label(completed_projects as f64, total_projects as f64),
    }
}

pub fn client_metrics_summary<'a, I>(records: I) -> ClientMetricsSummary
where
    I: IntoIterator<Item = &'a ClientMetricRecord>,
{
    let mut total_clients = 0;
    let mut total_reticula_calls = 0i64;
    let mut total_inex_one_expected = 0i64;
    let mut total_inex_one_completed = 0i64;
    let mut rate_sum = 0.0;
    let mut rated_clients = 0usize;

    for record in records {
        total_clients += 1;
        total_reticula_calls =
            total_reticula_calls.saturating_add(int_or_zero(&record.reticula_completed));
        total_inex_one_expected =
            total_inex_one_expected.saturating_add(int_or_zero(&record.inex_one_expected));
        total_inex_one_completed =
            total_inex_one_completed.saturating_add(int_or_zero(&record.inex_one_completed));

        let rate = float_or_zero(&record.rate);
        if rate > 0.0 {
            rate_sum += rate;
            rated_clients += 1;
        }
    }

    let average_rate = if rated_clients == 0 {
        "0".to_string()
    } else {
        to_fixed(rate_sum / rated_clients as f64, 2)
    };

    ClientMetricsSummary {
        total_clients,
        total_reticula_calls,
        total_inex_one_expected,
        total_inex_one_completed,
        average_rate,
        completion_rate: percentage_label(
            total_inex_one_completed as f64,
            total_inex_one_expected as f64,
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{client, project};

    #[test]
    fn empty_set_reports_zero_rate() {
        let summary = project_summary(std::iter::empty::<&ProjectRecord>());
        assert_eq!(summary.total_projects, 0);
        assert_eq!(summary.completed_rate, "0");
    }

    #[test]
    fn project_summary_counts_distinct_people() {
        let mut first = project("Alpha", "Acme", "Reticula");
        first.expert_name = "Ada".to_string();
        first.expert_interaction_state = "Call COMPLETED".to_string();
        let mut second = project("Beta", "Acme", "Reticula");
        second.expert_name = "Ada".to_string();
        let mut third = project("Gamma", "Globex", "Inex One");
        third.expert_name = "Bo".to_string();

        let records = vec![first, second, third];
        let summary = project_summary(&records);
        assert_eq!(summary.total_projects, 3);
        assert_eq!(summary.unique_clients, 2);
        assert_eq!(summary.unique_experts, 2);
        assert_eq!(summary.completed_projects, 1);
        assert_eq!(summary.completed_rate, "33.3");
    }

    #[test]
    fn completed_rate_rounds_ties_up() {
        let mut records: Vec<ProjectRecord> = (0..16)
            .map(|i| project(&format!("P{i}"), "Acme", "Reticula"))
            .collect();
        records[0].expert_interaction_state = "Completed".to_string();
        assert_eq!(project_summary(&records).completed_rate, "6.3");
    }

    #[test]
    fn call_totals_saturate_instead_of_overflowing() {
        let records = vec![
            client("Acme", "99999999999999999999", "9223372036854775807", "1"),
            client("Globex", "1", "1", "1"),
        ];
        let summary = client_metrics_summary(&records);
        assert_eq!(summary.total_reticula_calls, i64::MAX);
        assert_eq!(summary.total_inex_one_expected, i64::MAX);
        assert_eq!(summary.total_inex_one_completed, 2);
    }

    #[test]
    fn client_summary_matches_single_row_scenario() {
        let records = vec![client("Acme", "10", "20", "5")];
        let summary = client_metrics_summary(&records);
        assert_eq!(records[0].rate, "200.00");
        assert_eq!(summary.total_clients, 1);
        assert_eq!(summary.total_reticula_calls, 10);
        assert_eq!(summary.total_inex_one_expected, 20);
        assert_eq!(summary.total_inex_one_completed, 5);
        assert_eq!(summary.average_rate, "200.00");
        assert_eq!(summary.completion_rate, "25.0");
    }

    #[test]
    fn average_rate_skips_zero_rates() {
        let records = vec![
            client("Acme", "10", "20", "5"),
            client("Globex", "30", "10", "10"),
            client("Initech", "0", "0", "0"),
        ];
        let summary = client_metrics_summary(&records);
        assert_eq!(summary.average_rate, "250.00");
        assert_eq!(summary.completion_rate, "50.0");
    }

    #[test]
    fn no_expected_calls_means_zero_completion() {
        let records = vec![client("Acme", "0", "0", "0"), client("Globex", "x", "", "")];
        let summary = client_metrics_summary(&records);
        assert_eq!(summary.average_rate, "0");
        assert_eq!(summary.completion_rate, "0");
        assert_eq!(summary.total_reticula_calls, 0);
    }
}
