use std::fmt::Write;

use crate::compare::{
    ConditionViews, GroupKpi, GroupMetrics, GroupedComparison, PairwiseComparison,
};
use crate::filters::ProjectFilterOptions;
use crate::models::{CategoryCount, DistributionShare, HistogramBin, ProjectSummary};
use crate::state::{ClientMetricsViews, ProjectViews};

const LIST_PREVIEW: usize = 20;

pub fn build_project_report(views: &ProjectViews) -> String {
    let mut output = String::new();

    let _ = writeln!(output, "# Project Analytics Dashboard");
    let _ = writeln!(output);
    write_project_summary(&mut output, &views.summary);

    let _ = writeln!(output);
    let _ = writeln!(output, "## Global Timeline ({})", views.series);
    if views.timeline.is_empty() {
        let _ = writeln!(output, "No dated activity for this series.");
    } else {
        for point in &views.timeline {
            let _ = writeln!(output, "- {}: {}", point.date, point.count);
        }
    }

    let _ = writeln!(output);
    let _ = writeln!(output, "## Project Distribution by Interaction State");
    write_categories(&mut output, &views.interaction_states);

    let _ = writeln!(output);
    let _ = writeln!(output, "## Expert Final Outreach/Followup Number Distribution");
    for bucket in &views.followups {
        let _ = writeln!(output, "- {}: {}", bucket.followups, bucket.count);
    }

    let _ = writeln!(output);
    let _ = writeln!(output, "## Project Progress Funnel (Event Type)");
    for stage in &views.funnel {
        let _ = writeln!(
            output,
            "- {}: {} projects, {} experts, {} clients",
            stage.stage, stage.total_projects, stage.unique_experts, stage.unique_clients
        );
    }

    let _ = writeln!(output);
    let _ = writeln!(output, "## Geographic Activity");
    write_categories(&mut output, &views.geoscopes);

    let _ = writeln!(output);
    let _ = writeln!(output, "## Client Engagement by Project Type");
    if views.client_engagement.is_empty() {
        let _ = writeln!(output, "No clients in this selection.");
    } else {
        for row in &views.client_engagement {
            let _ = writeln!(
                output,
                "- {}: {} total (Reticula {}, Inex One {}, other {})",
                row.client_name, row.total, row.reticula, row.inex_one, row.other
            );
        }
    }

    let _ = writeln!(output);
    let _ = writeln!(output, "## Records");
    if views.records.is_empty() {
        let _ = writeln!(output, "No records match the current filters.");
    } else {
        for record in views.records.iter().take(LIST_PREVIEW) {
            let _ = writeln!(
                output,
                "- {} / {} ({}) with {}: {}",
                record.project_name,
                record.client_name,
                record.project_type,
                record.expert_name,
                record.expert_interaction_state
            );
        }
        if views.records.len() > LIST_PREVIEW {
            let _ = writeln!(output, "- ... {} more", views.records.len() - LIST_PREVIEW);
        }
    }

    output
}

pub fn build_client_metrics_report(views: &ClientMetricsViews) -> String {
    let mut output = String::new();
    let summary = &views.summary;

    let _ = writeln!(output, "# Client Metrics Dashboard");
    let _ = writeln!(output);
    let _ = writeln!(output, "- Total Clients: {}", summary.total_clients);
    let _ = writeln!(output, "- Reticula Calls: {}", summary.total_reticula_calls);
    let _ = writeln!(output, "- Inex One Expected: {}", summary.total_inex_one_expected);
    let _ = writeln!(output, "- Inex One Completed: {}", summary.total_inex_one_completed);
    let _ = writeln!(output, "- Average Rate: {}", summary.average_rate);
    let _ = writeln!(output, "- Completion Rate: {}%", summary.completion_rate);

    let _ = writeln!(output);
    let _ = writeln!(output, "## Top Clients by Rate");
    for entry in &views.top_by_rate {
        let _ = writeln!(
            output,
            "- {}: rate {:.2} (Reticula {}, Inex One completed {})",
            entry.client_name, entry.rate, entry.reticula_calls, entry.inex_one_completed
        );
    }

    let _ = writeln!(output);
    let _ = writeln!(output, "## Inex One Completed Calls Distribution");
    write_histogram(&mut output, &views.completed_histogram);

    let _ = writeln!(output);
    let _ = writeln!(output, "## Rate Distribution");
    write_histogram(&mut output, &views.rate_histogram);

    let _ = writeln!(output);
    let _ = writeln!(output, "## Client Metrics List");
    let _ = writeln!(output, "Showing {} clients", views.records.len());
    for record in &views.records {
        let _ = writeln!(
            output,
            "- {}: Reticula {}, expected {}, completed {}, rate {}",
            record.client_name,
            record.reticula_completed,
            record.inex_one_expected,
            record.inex_one_completed,
            record.rate
        );
    }

    output
}

pub fn build_comparison_report(comparison: &PairwiseComparison) -> String {
    let mut output = String::new();

    let _ = writeln!(output, "# Data Comparison");
    write_condition(&mut output, "Condition 1", &comparison.first);
    write_condition(&mut output, "Condition 2", &comparison.second);

    output
}

pub fn build_grouped_report(comparison: &GroupedComparison) -> String {
    let mut output = String::new();

    let _ = writeln!(output, "# Compare All {}", comparison.group_by.label());
    if comparison.groups.is_empty() {
        let _ = writeln!(output);
        let _ = writeln!(output, "No values to compare.");
        return output;
    }

    for group in &comparison.groups {
        let _ = writeln!(output);
        let _ = writeln!(output, "## {}", group.name);
        let summary = &group.summary;
        let _ = writeln!(
            output,
            "- Total: {}",
            mark(group, GroupKpi::TotalProjects, summary.total_projects)
        );
        let _ = writeln!(
            output,
            "- Clients: {}",
            mark(group, GroupKpi::UniqueClients, summary.unique_clients)
        );
        let _ = writeln!(
            output,
            "- Experts: {}",
            mark(group, GroupKpi::UniqueExperts, summary.unique_experts)
        );
        let _ = writeln!(
            output,
            "- Completed: {}",
            mark(group, GroupKpi::CompletedProjects, summary.completed_projects)
        );
        let _ = writeln!(
            output,
            "- Rate: {}",
            mark(group, GroupKpi::CompletedRate, format!("{}%", summary.completed_rate))
        );
        write_shares(&mut output, "Followup", &group.followups);
        write_shares(&mut output, "Event Type", &group.event_types);
        write_shares(&mut output, "Geographic", &group.geoscopes);
    }

    output
}

pub fn build_options_report(options: &ProjectFilterOptions) -> String {
    let mut output = String::new();

    let _ = writeln!(output, "# Filter Options");
    for (title, values) in [
        ("Project Type", &options.project_types),
        ("Project Manager", &options.project_managers),
        ("Client Name", &options.client_names),
        ("Geoscope", &options.geoscopes),
        ("Industry", &options.industries),
        ("Event Type", &options.event_types),
        ("Event Executor Associate", &options.event_executor_associates),
        ("Expert Final Terms State", &options.expert_terms_states),
    ] {
        let _ = writeln!(output);
        let _ = writeln!(output, "## {title}");
        for value in values {
            let _ = writeln!(output, "- {value}");
        }
    }

    output
}

fn write_project_summary(output: &mut String, summary: &ProjectSummary) {
    let _ = writeln!(output, "- Total Projects: {}", summary.total_projects);
    let _ = writeln!(output, "- Unique Clients: {}", summary.unique_clients);
    let _ = writeln!(output, "- Unique Experts: {}", summary.unique_experts);
    let _ = writeln!(output, "- Completed: {}", summary.completed_projects);
    let _ = writeln!(output, "- Completed Rate: {}%", summary.completed_rate);
}

fn write_condition(output: &mut String, title: &str, views: &ConditionViews) {
    let _ = writeln!(output);
    let _ = writeln!(output, "## {title}");
    write_project_summary(output, &views.summary);
    let _ = writeln!(output);
    let _ = writeln!(output, "### Interaction States");
    write_categories(output, &views.interaction_states);
    let _ = writeln!(output);
    let _ = writeln!(output, "### Followup Numbers");
    for bucket in &views.followups {
        let _ = writeln!(output, "- {}: {}", bucket.followups, bucket.count);
    }
    let _ = writeln!(output);
    let _ = writeln!(output, "### Event Type Funnel");
    for stage in &views.funnel {
        let _ = writeln!(output, "- {}: {}", stage.stage, stage.total_projects);
    }
    let _ = writeln!(output);
    let _ = writeln!(output, "### Geographic Activity");
    write_categories(output, &views.geoscopes);
}

fn write_categories(output: &mut String, counts: &[CategoryCount]) {
    if counts.is_empty() {
        let _ = writeln!(output, "No records in this selection.");
        return;
    }
    for count in counts {
        let _ = writeln!(
            output,
            "- {}: {} ({:.1}%)",
            count.label, count.count, count.percentage
        );
    }
}

fn write_histogram(output: &mut String, bins: &[HistogramBin]) {
    if bins.is_empty() {
        let _ = writeln!(output, "No values to bin.");
        return;
    }
    for bin in bins {
        let _ = writeln!(output, "- {}: {}", bin.label, bin.count);
    }
}

fn write_shares(output: &mut String, title: &str, shares: &[DistributionShare]) {
    let rendered: Vec<String> = shares
        .iter()
        .map(|share| format!("{}: {} ({}%)", share.label, share.count, share.percentage))
        .collect();
    let _ = writeln!(output, "- {title}: {}", rendered.join(", "));
}

fn mark(group: &GroupMetrics, kpi: GroupKpi, value: impl std::fmt::Display) -> String {
    if group.highlights.contains(&kpi) {
        format!("**{value}**")
    } else {
        value.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compare::{GroupBy, GroupSort};
    use crate::state::{ClientMetricsDashboard, ProjectDashboard, Snapshot};
    use crate::test_support::{client, project};

    #[test]
    fn project_report_lists_sections() {
        let views = ProjectDashboard::new(vec![project("Alpha", "Acme", "Reticula")]).derive();
        let report = build_project_report(&views);
        assert!(report.contains("# Project Analytics Dashboard"));
        assert!(report.contains("- Total Projects: 1"));
        assert!(report.contains("## Global Timeline (Completed)"));
        assert!(report.contains("- EMEA: 1 (100.0%)"));
    }

    #[test]
    fn client_report_includes_rate() {
        let views = ClientMetricsDashboard::new(vec![client("Acme", "10", "20", "5")]).derive();
        let report = build_client_metrics_report(&views);
        assert!(report.contains("- Completion Rate: 25.0%"));
        assert!(report.contains("rate 200.00"));
    }

    #[test]
    fn grouped_report_bolds_highest_values() {
        let records = vec![
            project("Alpha", "Acme", "Reticula"),
            project("Beta", "Globex", "Reticula"),
        ];
        let grouped =
            ProjectDashboard::new(records).compare_groups(GroupBy::Managers, GroupSort::default());
        let report = build_grouped_report(&grouped);
        assert!(report.contains("## Dana Whitfield"));
        assert!(report.contains("- Total: **2**"));
        assert!(report.contains("- Event Type: Call: 2 (100.0%)"));
    }
}
