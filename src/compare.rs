use std::cmp::Ordering;
use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::distribution::{self, categorical, followup_distribution};
use crate::filters::{filter_projects, ProjectFilter};
use crate::models::{
    CategoryCount, DistributionShare, FollowupBucket, FunnelStage, ProjectField, ProjectRecord,
    ProjectSummary,
};
use crate::normalize::float_or_zero;
use crate::sort::{compare_text, SortDirection, SortState};
use crate::summary::{percentage_label, project_summary};

pub const COMPACT_DISTRIBUTION_SIZE: usize = 3;

/// Everything shown for one side of a comparison.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConditionViews {
    pub condition: ProjectFilter,
    pub summary: ProjectSummary,
    pub interaction_states: Vec<CategoryCount>,
    pub followups: Vec<FollowupBucket>,
    pub funnel: Vec<FunnelStage>,
    pub geoscopes: Vec<CategoryCount>,
}

impl ConditionViews {
    pub fn derive(condition: &ProjectFilter, records: &[&ProjectRecord]) -> Self {
        Self {
            condition: condition.clone(),
            summary: project_summary(records.iter().copied()),
            interaction_states: categorical(
                records.iter().copied(),
                ProjectField::ExpertInteractionState,
            ),
            followups: followup_distribution(records.iter().copied()),
            funnel: distribution::event_funnel(records.iter().copied()),
            geoscopes: distribution::top(
                categorical(records.iter().copied(), ProjectField::Geoscope),
                distribution::LEADERBOARD_SIZE,
            ),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PairwiseComparison {
    pub first: ConditionViews,
    pub second: ConditionViews,
}

/// Applies each condition to the full record set independently.
pub fn compare_conditions(
    records: &[ProjectRecord],
    first: &ProjectFilter,
    second: &ProjectFilter,
) -> PairwiseComparison {
    let first_records = filter_projects(records, first);
    let second_records = filter_projects(records, second);
    debug!(
        first = first_records.len(),
        second = second_records.len(),
        "pairwise comparison"
    );

    PairwiseComparison {
        first: ConditionViews::derive(first, &first_records),
        second: ConditionViews::derive(second, &second_records),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GroupBy {
    Managers,
    Associates,
}

impl GroupBy {
    pub fn field(self) -> ProjectField {
        match self {
            GroupBy::Managers => ProjectField::ProjectManager,
            GroupBy::Associates => ProjectField::EventExecutorAssociate,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            GroupBy::Managers => "Managers",
            GroupBy::Associates => "Associates",
        }
    }

    /// The single-field condition selecting one group.
    pub fn condition(self, value: &str) -> ProjectFilter {
        let value = Some(value.to_string());
        match self {
            GroupBy::Managers => ProjectFilter {
                project_manager: value,
                ..ProjectFilter::default()
            },
            GroupBy::Associates => ProjectFilter {
                event_executor_associate: value,
                ..ProjectFilter::default()
            },
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GroupKpi {
    TotalProjects,
    UniqueClients,
    UniqueExperts,
    CompletedProjects,
    CompletedRate,
}

impl GroupKpi {
    pub const ALL: [GroupKpi; 5] = [
        GroupKpi::TotalProjects,
        GroupKpi::UniqueClients,
        GroupKpi::UniqueExperts,
        GroupKpi::CompletedProjects,
        GroupKpi::CompletedRate,
    ];

    fn value(self, summary: &ProjectSummary) -> f64 {
        match self {
            GroupKpi::TotalProjects => summary.total_projects as f64,
            GroupKpi::UniqueClients => summary.unique_clients as f64,
            GroupKpi::UniqueExperts => summary.unique_experts as f64,
            GroupKpi::CompletedProjects => summary.completed_projects as f64,
            GroupKpi::CompletedRate => float_or_zero(&summary.completed_rate),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GroupSortField {
    Name,
    Kpi(GroupKpi),
}

pub type GroupSort = SortState<GroupSortField>;

impl Default for SortState<GroupSortField> {
    fn default() -> Self {
        Self::new(
            GroupSortField::Kpi(GroupKpi::TotalProjects),
            SortDirection::Descending,
        )
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroupMetrics {
    pub name: String,
    pub condition: ProjectFilter,
    pub summary: ProjectSummary,
    pub followups: Vec<DistributionShare>,
    pub event_types: Vec<DistributionShare>,
    pub geoscopes: Vec<DistributionShare>,
    /// KPIs on which this group ties for the highest value.
    pub highlights: Vec<GroupKpi>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroupedComparison {
    pub group_by: GroupBy,
    pub sort: GroupSort,
    pub groups: Vec<GroupMetrics>,
}

/// One column per distinct non-empty value of the grouping field.
pub fn compare_groups(
    records: &[ProjectRecord],
    group_by: GroupBy,
    sort: GroupSort,
) -> GroupedComparison {
    let field = group_by.field();
    let mut slots: HashMap<&str, usize> = HashMap::new();
    let mut members: Vec<(&str, Vec<&ProjectRecord>)> = Vec::new();

    for record in records {
        let key = field.value(record);
        if key.is_empty() {
            continue;
        }
        let slot = *slots.entry(key).or_insert_with(|| {
            members.push((key, Vec::new()));
            members.len() - 1
        });
        members[slot].1.push(record);
    }

    let mut groups: Vec<GroupMetrics> = members
        .into_iter()
        .map(|(name, rows)| group_metrics(group_by, name, &rows))
        .collect();

    mark_highest(&mut groups);
    groups.sort_by(|a, b| sort.direction.apply(compare_groups_by(sort.field, a, b)));
    debug!(groups = groups.len(), by = group_by.label(), "grouped comparison");

    GroupedComparison {
        group_by,
        sort,
        groups,
    }
}

fn group_metrics(group_by: GroupBy, name: &str, rows: &[&ProjectRecord]) -> GroupMetrics {
    let summary = project_summary(rows.iter().copied());
    let total = summary.total_projects;

    let mut followups: Vec<(String, usize)> = followup_distribution(rows.iter().copied())
        .into_iter()
        .filter(|bucket| bucket.count > 0)
        .map(|bucket| (bucket.followups.to_string(), bucket.count))
        .collect();
    followups.sort_by(|a, b| b.1.cmp(&a.1));

    let event_types: Vec<(String, usize)> =
        categorical(rows.iter().copied(), ProjectField::EventType)
            .into_iter()
            .map(|c| (c.label, c.count))
            .collect();
    let geoscopes: Vec<(String, usize)> =
        categorical(rows.iter().copied(), ProjectField::Geoscope)
            .into_iter()
            .map(|c| (c.label, c.count))
            .collect();

    GroupMetrics {
        name: name.to_string(),
        condition: group_by.condition(name),
        summary,
        followups: compact_shares(followups, total),
        event_types: compact_shares(event_types, total),
        geoscopes: compact_shares(geoscopes, total),
        highlights: Vec::new(),
    }
}

/// Top entries of an already count-ordered distribution with their share of `total`.
fn compact_shares(counts: Vec<(String, usize)>, total: usize) -> Vec<DistributionShare> {
    counts
        .into_iter()
        .take(COMPACT_DISTRIBUTION_SIZE)
        .map(|(label, count)| DistributionShare {
            label,
            count,
            percentage: percentage_label(count as f64, total as f64),
        })
        .collect()
}

fn mark_highest(groups: &mut [GroupMetrics]) {
    for kpi in GroupKpi::ALL {
        let Some(highest) = groups
            .iter()
            .map(|group| kpi.value(&group.summary))
            .reduce(f64::max)
        else {
            return;
        };
        for group in groups.iter_mut() {
            if kpi.value(&group.summary) == highest {
                group.highlights.push(kpi);
            }
        }
    }
}

fn compare_groups_by(field: GroupSortField, a: &GroupMetrics, b: &GroupMetrics) -> Ordering {
    match field {
        GroupSortField::Name => compare_text(&a.name, &b.name),
        GroupSortField::Kpi(kpi) => kpi.value(&a.summary).total_cmp(&kpi.value(&b.summary)),
    }
}
