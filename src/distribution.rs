use std::collections::{BTreeMap, HashMap, HashSet};

use crate::models::{
    CategoryCount, ClientEngagement, ClientMetricField, ClientMetricRecord, ClientRateEntry,
    FollowupBucket, FunnelStage, HistogramBin, ProjectField, ProjectRecord,
};
use crate::normalize::{
    contains_ignore_case, float_or_zero, int_or_zero, normalize_project_type, to_fixed, INEX_ONE,
    RETICULA,
};

pub const UNKNOWN_LABEL: &str = "Unknown";
pub const MAX_FOLLOWUPS: u8 = 6;
pub const FUNNEL_STAGES: [&str; 5] = ["completed", "call", "interaction set", "present", "index"];
pub const LEADERBOARD_SIZE: usize = 10;

/// Counts per distinct value of `field`, largest first. Empty values are
/// counted under [`UNKNOWN_LABEL`]; ties keep first-seen order.
pub fn categorical<'a, I>(records: I, field: ProjectField) -> Vec<CategoryCount>
where
    I: IntoIterator<Item = &'a ProjectRecord>,
{
    let mut slots: HashMap<&str, usize> = HashMap::new();
    let mut counts: Vec<(&str, usize)> = Vec::new();
    let mut total = 0usize;

    for record in records {
        let value = field.value(record);
        let label = if value.is_empty() { UNKNOWN_LABEL } else { value };
        let slot = *slots.entry(label).or_insert_with(|| {
            counts.push((label, 0));
            counts.len() - 1
        });
        counts[slot].1 += 1;
        total += 1;
    }

    counts.sort_by(|a, b| b.1.cmp(&a.1));
    counts
        .into_iter()
        .map(|(label, count)| CategoryCount {
            label: label.to_string(),
            count,
            percentage: if total == 0 {
                0.0
            } else {
                count as f64 / total as f64 * 100.0
            },
        })
        .collect()
}

pub fn top(mut counts: Vec<CategoryCount>, limit: usize) -> Vec<CategoryCount> {
    counts.truncate(limit);
    counts
}

/// Followup count of a record; values that do not parse count as zero.
pub fn followup_value(record: &ProjectRecord) -> i64 {
    int_or_zero(&record.followup_number)
}

/// Dense counts for followup numbers 0 through 6. Values outside the range
/// are dropped.
pub fn followup_distribution<'a, I>(records: I) -> Vec<FollowupBucket>
where
    I: IntoIterator<Item = &'a ProjectRecord>,
{
    let mut counts = [0usize; MAX_FOLLOWUPS as usize + 1];
    for record in records {
        if let Ok(index) = usize::try_from(followup_value(record)) {
            if let Some(slot) = counts.get_mut(index) {
                *slot += 1;
            }
        }
    }

    (0..=MAX_FOLLOWUPS)
        .zip(counts)
        .map(|(followups, count)| FollowupBucket { followups, count })
        .collect()
}

/// Histogram over an integer call-count field. Bin width is
/// `max(1, ceil(max / 10))`; only non-empty bins are emitted, lowest first.
pub fn integer_histogram<'a, I>(records: I, field: ClientMetricField) -> Vec<HistogramBin>
where
    I: IntoIterator<Item = &'a ClientMetricRecord>,
{
    let values: Vec<i64> = records
        .into_iter()
        .map(|record| int_or_zero(field.value(record)))
        .collect();
    let Some(&max) = values.iter().max() else {
        return Vec::new();
    };

    let width = ((max as f64 / 10.0).ceil() as i64).max(1);
    let mut bins: BTreeMap<i64, usize> = BTreeMap::new();
    for value in values {
        *bins.entry(value.saturating_sub(value.rem_euclid(width))).or_default() += 1;
    }

    bins.into_iter()
        .map(|(lower, count)| HistogramBin {
            lower: lower as f64,
            label: format!("{}-{}", lower, lower.saturating_add(width - 1)),
            count,
        })
        .collect()
}

/// Histogram over Rate with width `max(0.1, max / 10)`. Zero rates mark
/// clients whose rate could not be computed and are left out.
pub fn rate_histogram<'a, I>(records: I) -> Vec<HistogramBin>
where
    I: IntoIterator<Item = &'a ClientMetricRecord>,
{
    let rates: Vec<f64> = records
        .into_iter()
        .map(|record| float_or_zero(&record.rate))
        .filter(|rate| *rate > 0.0 && rate.is_finite())
        .collect();
    let Some(max) = rates.iter().copied().reduce(f64::max) else {
        return Vec::new();
    };

    let width = (max / 10.0).max(0.1);
    let mut bins: BTreeMap<i64, usize> = BTreeMap::new();
    for rate in rates {
        *bins.entry((rate / width).floor() as i64).or_default() += 1;
    }

    bins.into_iter()
        .map(|(index, count)| {
            let lower = index as f64 * width;
            HistogramBin {
                lower,
                label: format!("{}-{}", to_fixed(lower, 1), to_fixed(lower + width, 1)),
                count,
            }
        })
        .collect()
}

/// Progress stages matched against Event Type, each reported three ways.
pub fn event_funnel<'a, I>(records: I) -> Vec<FunnelStage>
where
    I: IntoIterator<Item = &'a ProjectRecord>,
{
    let mut totals = [0usize; FUNNEL_STAGES.len()];
    let mut experts: [HashSet<&str>; FUNNEL_STAGES.len()] = Default::default();
    let mut clients: [HashSet<&str>; FUNNEL_STAGES.len()] = Default::default();

    for record in records {
        let event_type = record.event_type.to_lowercase();
        for (index, stage) in FUNNEL_STAGES.iter().enumerate() {
            if event_type.contains(stage) {
                totals[index] += 1;
                experts[index].insert(record.expert_name.as_str());
                clients[index].insert(record.client_name.as_str());
            }
        }
    }

    FUNNEL_STAGES
        .iter()
        .enumerate()
        .map(|(index, stage)| FunnelStage {
            stage: *stage,
            total_projects: totals[index],
            unique_experts: experts[index].len(),
            unique_clients: clients[index].len(),
        })
        .collect()
}

/// Records per client split by canonical project type, busiest clients first.
pub fn client_engagement<'a, I>(records: I) -> Vec<ClientEngagement>
where
    I: IntoIterator<Item = &'a ProjectRecord>,
{
    let mut slots: HashMap<&str, usize> = HashMap::new();
    let mut rows: Vec<ClientEngagement> = Vec::new();

    for record in records {
        let client = if record.client_name.is_empty() {
            UNKNOWN_LABEL
        } else {
            record.client_name.as_str()
        };
        let slot = *slots.entry(client).or_insert_with(|| {
            rows.push(ClientEngagement {
                client_name: client.to_string(),
                reticula: 0,
                inex_one: 0,
                other: 0,
                total: 0,
            });
            rows.len() - 1
        });

        let row = &mut rows[slot];
        match normalize_project_type(&record.project_type).as_str() {
            RETICULA => row.reticula += 1,
            INEX_ONE => row.inex_one += 1,
            _ => row.other += 1,
        }
        row.total += 1;
    }

    rows.sort_by(|a, b| b.total.cmp(&a.total));
    rows.truncate(LEADERBOARD_SIZE);
    rows
}

/// The highest-rate clients with their call volumes.
pub fn top_clients_by_rate<'a, I>(records: I) -> Vec<ClientRateEntry>
where
    I: IntoIterator<Item = &'a ClientMetricRecord>,
{
    let mut entries: Vec<ClientRateEntry> = records
        .into_iter()
        .map(|record| ClientRateEntry {
            client_name: record.client_name.clone(),
            rate: float_or_zero(&record.rate),
            reticula_calls: int_or_zero(&record.reticula_completed),
            inex_one_completed: int_or_zero(&record.inex_one_completed),
        })
        .collect();

    entries.sort_by(|a, b| b.rate.total_cmp(&a.rate));
    entries.truncate(LEADERBOARD_SIZE);
    entries
}

pub fn event_matches(record: &ProjectRecord, keyword: &str) -> bool {
    contains_ignore_case(&record.expert_interaction_state, keyword)
        || contains_ignore_case(&record.event_type, keyword)
}
