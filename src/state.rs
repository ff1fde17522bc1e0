use std::sync::Arc;

use serde::Serialize;
use tracing::debug;

use crate::compare::{
    compare_conditions, compare_groups, GroupBy, GroupSort, GroupedComparison, PairwiseComparison,
};
use crate::distribution::{
    categorical, client_engagement, event_funnel, followup_distribution, integer_histogram,
    rate_histogram, top, top_clients_by_rate, LEADERBOARD_SIZE,
};
use crate::filters::{
    client_metric_name_options, filter_client_metrics, filter_projects, project_filter_options,
    ClientMetricFilter, ProjectFilter, ProjectFilterOptions,
};
use crate::models::{
    CategoryCount, ClientEngagement, ClientMetricField, ClientMetricRecord, ClientMetricsSummary,
    ClientRateEntry, FollowupBucket, FunnelStage, HistogramBin, ProjectField, ProjectRecord,
    ProjectSummary, TimePoint,
};
use crate::sort::{sort_client_metrics, sort_projects, ClientMetricSort, ProjectSort};
use crate::summary::{client_metrics_summary, project_summary};
use crate::timeline::{build_series, SeriesKind};

/// An immutable dashboard snapshot that can be turned into display views.
pub trait Snapshot {
    type Views;

    /// True when both snapshots would derive identical views.
    fn same_inputs(&self, other: &Self) -> bool;

    fn derive(&self) -> Self::Views;
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProjectViews {
    pub options: ProjectFilterOptions,
    pub records: Vec<ProjectRecord>,
    pub summary: ProjectSummary,
    pub interaction_states: Vec<CategoryCount>,
    pub followups: Vec<FollowupBucket>,
    pub funnel: Vec<FunnelStage>,
    pub event_types: Vec<CategoryCount>,
    pub geoscopes: Vec<CategoryCount>,
    pub client_engagement: Vec<ClientEngagement>,
    pub series: SeriesKind,
    pub timeline: Vec<TimePoint>,
}

#[derive(Debug, Clone)]
pub struct ProjectDashboard {
    records: Arc<[ProjectRecord]>,
    filter: ProjectFilter,
    sort: ProjectSort,
    series: SeriesKind,
}

impl ProjectDashboard {
    pub fn new(records: Vec<ProjectRecord>) -> Self {
        Self {
            records: records.into(),
            filter: ProjectFilter::default(),
            sort: ProjectSort::default(),
            series: SeriesKind::default(),
        }
    }

    pub fn records(&self) -> &[ProjectRecord] {
        &self.records
    }

    pub fn filter(&self) -> &ProjectFilter {
        &self.filter
    }

    pub fn sort(&self) -> ProjectSort {
        self.sort
    }

    pub fn series(&self) -> SeriesKind {
        self.series
    }

    pub fn with_filter(self, filter: ProjectFilter) -> Self {
        Self { filter, ..self }
    }

    pub fn with_sort(self, sort: ProjectSort) -> Self {
        Self { sort, ..self }
    }

    pub fn toggle_sort(self, field: ProjectField) -> Self {
        let sort = self.sort.toggled(field);
        Self { sort, ..self }
    }

    pub fn with_series(self, series: SeriesKind) -> Self {
        Self { series, ..self }
    }

    /// A new upload replaces the data wholesale and clears the filters.
    pub fn replace_records(self, records: Vec<ProjectRecord>) -> Self {
        Self {
            records: records.into(),
            filter: ProjectFilter::default(),
            ..self
        }
    }

    /// Two conditions evaluated against the full upload, not the current filter.
    pub fn compare(&self, first: &ProjectFilter, second: &ProjectFilter) -> PairwiseComparison {
        compare_conditions(&self.records, first, second)
    }

    pub fn compare_groups(&self, group_by: GroupBy, sort: GroupSort) -> GroupedComparison {
        compare_groups(&self.records, group_by, sort)
    }
}

impl Snapshot for ProjectDashboard {
    type Views = ProjectViews;

    fn same_inputs(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.records, &other.records)
            && self.filter == other.filter
            && self.sort == other.sort
            && self.series == other.series
    }

    fn derive(&self) -> ProjectViews {
        let mut filtered = filter_projects(&self.records, &self.filter);
        let rows = || filtered.iter().copied();

        let views = ProjectViews {
            options: project_filter_options(&self.records, &self.filter),
            records: Vec::new(),
            summary: project_summary(rows()),
            interaction_states: categorical(rows(), ProjectField::ExpertInteractionState),
            followups: followup_distribution(rows()),
            funnel: event_funnel(rows()),
            event_types: categorical(rows(), ProjectField::EventType),
            geoscopes: top(categorical(rows(), ProjectField::Geoscope), LEADERBOARD_SIZE),
            client_engagement: client_engagement(rows()),
            series: self.series,
            timeline: build_series(rows(), self.series),
        };

        sort_projects(&mut filtered, &self.sort);
        ProjectViews {
            records: filtered.into_iter().cloned().collect(),
            ..views
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClientMetricsViews {
    pub client_names: Vec<String>,
    pub records: Vec<ClientMetricRecord>,
    pub summary: ClientMetricsSummary,
    pub completed_histogram: Vec<HistogramBin>,
    pub rate_histogram: Vec<HistogramBin>,
    pub top_by_rate: Vec<ClientRateEntry>,
}

#[derive(Debug, Clone)]
pub struct ClientMetricsDashboard {
    records: Arc<[ClientMetricRecord]>,
    filter: ClientMetricFilter,
    sort: ClientMetricSort,
}

impl ClientMetricsDashboard {
    pub fn new(records: Vec<ClientMetricRecord>) -> Self {
        Self {
            records: records.into(),
            filter: ClientMetricFilter::default(),
            sort: ClientMetricSort::default(),
        }
    }

    pub fn records(&self) -> &[ClientMetricRecord] {
        &self.records
    }

    pub fn filter(&self) -> &ClientMetricFilter {
        &self.filter
    }

    pub fn sort(&self) -> ClientMetricSort {
        self.sort
    }

    pub fn with_filter(self, filter: ClientMetricFilter) -> Self {
        Self { filter, ..self }
    }

    pub fn with_sort(self, sort: ClientMetricSort) -> Self {
        Self { sort, ..self }
    }

    pub fn toggle_sort(self, field: ClientMetricField) -> Self {
        let sort = self.sort.toggled(field);
        Self { sort, ..self }
    }

    pub fn replace_records(self, records: Vec<ClientMetricRecord>) -> Self {
        Self {
            records: records.into(),
            filter: ClientMetricFilter::default(),
            ..self
        }
    }
}

impl Snapshot for ClientMetricsDashboard {
    type Views = ClientMetricsViews;

    fn same_inputs(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.records, &other.records)
            && self.filter == other.filter
            && self.sort == other.sort
    }

    fn derive(&self) -> ClientMetricsViews {
        let mut filtered = filter_client_metrics(&self.records, &self.filter);
        sort_client_metrics(&mut filtered, &self.sort);
        let rows = || filtered.iter().copied();

        ClientMetricsViews {
            client_names: client_metric_name_options(&self.records),
            summary: client_metrics_summary(rows()),
            completed_histogram: integer_histogram(rows(), ClientMetricField::InexOneCompleted),
            rate_histogram: rate_histogram(rows()),
            top_by_rate: top_clients_by_rate(rows()),
            records: filtered.iter().map(|record| (*record).clone()).collect(),
        }
    }
}

/// Remembers the views of the last snapshot it derived. A snapshot with
/// different inputs always recomputes.
pub struct DerivationCache<S: Snapshot> {
    last: Option<(S, Arc<S::Views>)>,
    hits: u64,
    misses: u64,
}

impl<S: Snapshot + Clone> DerivationCache<S> {
    pub fn new() -> Self {
        Self {
            last: None,
            hits: 0,
            misses: 0,
        }
    }

    pub fn views(&mut self, snapshot: &S) -> Arc<S::Views> {
        if let Some((cached, views)) = &self.last {
            if cached.same_inputs(snapshot) {
                self.hits += 1;
                debug!(hits = self.hits, "derived views served from cache");
                return Arc::clone(views);
            }
        }

        self.misses += 1;
        debug!(misses = self.misses, "recomputing derived views");
        let views = Arc::new(snapshot.derive());
        self.last = Some((snapshot.clone(), Arc::clone(&views)));
        views
    }

    pub fn hits(&self) -> u64 {
        self.hits
    }

    pub fn misses(&self) -> u64 {
        self.misses
    }
}

impl<S: Snapshot + Clone> Default for DerivationCache<S> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sort::SortDirection;
    use crate::test_support::{client, project};

    fn projects() -> Vec<ProjectRecord> {
        let mut alpha = project("Alpha", "Acme", "inex.one");
        alpha.expert_interaction_state = "Completed".to_string();
        let beta = project("Beta", "Globex", "Inex One");
        let gamma = project("Gamma", "Initech", "Reticula");
        vec![gamma, alpha, beta]
    }

    #[test]
    fn derive_applies_filter_then_sort() {
        let dashboard = ProjectDashboard::new(projects()).with_filter(ProjectFilter {
            project_type: Some("Inex One".to_string()),
            ..ProjectFilter::default()
        });
        let views = dashboard.derive();

        let names: Vec<&str> = views.records.iter().map(|r| r.project_name.as_str()).collect();
        assert_eq!(names, vec!["Alpha", "Beta"]);
        assert_eq!(views.summary.total_projects, 2);
        assert_eq!(views.summary.completed_rate, "50.0");
        assert_eq!(views.followups.len(), 7);
        assert_eq!(views.options.client_names, vec!["Acme", "Globex"]);
    }

    #[test]
    fn actions_produce_new_snapshots() {
        let dashboard = ProjectDashboard::new(projects());
        let sorted = dashboard.clone().toggle_sort(ProjectField::ProjectName);
        assert_eq!(sorted.sort().direction, SortDirection::Descending);
        assert_eq!(dashboard.sort().direction, SortDirection::Ascending);

        let views = sorted.derive();
        assert_eq!(views.records[0].project_name, "Gamma");
    }

    #[test]
    fn comparisons_ignore_the_global_filter() {
        let dashboard = ProjectDashboard::new(projects()).with_filter(ProjectFilter {
            client_name: Some("Acme".to_string()),
            ..ProjectFilter::default()
        });
        let comparison = dashboard.compare(&ProjectFilter::default(), &dashboard.filter().clone());
        assert_eq!(comparison.first.summary.total_projects, 3);
        assert_eq!(comparison.second.summary.total_projects, 1);

        let grouped = dashboard.compare_groups(GroupBy::Managers, GroupSort::default());
        assert_eq!(grouped.groups[0].summary.total_projects, 3);
    }

    #[test]
    fn cache_recomputes_only_on_changed_inputs() {
        let mut cache = DerivationCache::new();
        let dashboard = ProjectDashboard::new(projects());

        let first = cache.views(&dashboard);
        let again = cache.views(&dashboard.clone());
        assert!(Arc::ptr_eq(&first, &again));
        assert_eq!((cache.hits(), cache.misses()), (1, 1));

        let narrowed = dashboard.with_series(SeriesKind::Projects);
        let changed = cache.views(&narrowed);
        assert_eq!(changed.series, SeriesKind::Projects);
        assert_eq!(cache.misses(), 2);

        let reloaded = narrowed.replace_records(projects());
        cache.views(&reloaded);
        assert_eq!(cache.misses(), 3);
    }

    #[test]
    fn client_metrics_views_follow_filter_and_sort() {
        let dashboard = ClientMetricsDashboard::new(vec![
            client("Acme", "10", "20", "5"),
            client("Globex", "30", "10", "10"),
            client("Initech", "0", "5", "0"),
        ])
        .with_filter(ClientMetricFilter {
            min_rate: Some(1.0),
            ..ClientMetricFilter::default()
        })
        .toggle_sort(ClientMetricField::Rate)
        .toggle_sort(ClientMetricField::Rate);

        let views = dashboard.derive();
        let names: Vec<&str> = views.records.iter().map(|r| r.client_name.as_str()).collect();
        assert_eq!(names, vec!["Globex", "Acme"]);
        assert_eq!(views.summary.total_clients, 2);
        assert_eq!(views.client_names, vec!["Acme", "Globex", "Initech"]);
        assert_eq!(views.rate_histogram.len(), 2);
        assert_eq!(views.top_by_rate[0].client_name, "Globex");
    }
}
