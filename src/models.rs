use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// One row of project / expert-interaction data. Every value stays a string
/// until a derivation parses it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectRecord {
    #[serde(rename = "Project Name")]
    pub project_name: String,
    #[serde(rename = "Project Start Date")]
    pub project_start_date: String,
    #[serde(rename = "Project Geoscope")]
    pub geoscope: String,
    #[serde(rename = "Project Industry")]
    pub industry: String,
    #[serde(rename = "Project Manager")]
    pub project_manager: String,
    #[serde(rename = "Project Associates")]
    pub project_associates: String,
    #[serde(rename = "Project Demand")]
    pub project_demand: String,
    #[serde(rename = "Client Name")]
    pub client_name: String,
    #[serde(rename = "Project Type")]
    pub project_type: String,
    #[serde(rename = "Expert Name")]
    pub expert_name: String,
    #[serde(rename = "Expert Final Terms State")]
    pub expert_terms_state: String,
    #[serde(rename = "Expert Final Interaction State")]
    pub expert_interaction_state: String,
    #[serde(rename = "Expert Final Outreach/Followup Number")]
    pub followup_number: String,
    #[serde(rename = "Event Executor Associate")]
    pub event_executor_associate: String,
    #[serde(rename = "Event Type")]
    pub event_type: String,
    #[serde(rename = "Event Date")]
    pub event_date: String,
}

/// One row of client call-performance data. `rate` is always synthesized at
/// ingestion, never read from input.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ClientMetricRecord {
    #[serde(rename = "Client Name")]
    pub client_name: String,
    #[serde(rename = "Reticula Completed Calls")]
    pub reticula_completed: String,
    #[serde(rename = "Inex One Expected Calls")]
    pub inex_one_expected: String,
    #[serde(rename = "Inex One Completed Calls")]
    pub inex_one_completed: String,
    #[serde(rename = "Rate")]
    pub rate: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProjectField {
    ProjectName,
    ProjectStartDate,
    Geoscope,
    Industry,
    ProjectManager,
    ProjectAssociates,
    ProjectDemand,
    ClientName,
    ProjectType,
    ExpertName,
    ExpertTermsState,
    ExpertInteractionState,
    FollowupNumber,
    EventExecutorAssociate,
    EventType,
    EventDate,
}

impl ProjectField {
    pub const ALL: [ProjectField; 16] = [
        ProjectField::ProjectName,
        ProjectField::ProjectStartDate,
        ProjectField::Geoscope,
        ProjectField::Industry,
        ProjectField::ProjectManager,
        ProjectField::ProjectAssociates,
        ProjectField::ProjectDemand,
        ProjectField::ClientName,
        ProjectField::ProjectType,
        ProjectField::ExpertName,
        ProjectField::ExpertTermsState,
        ProjectField::ExpertInteractionState,
        ProjectField::FollowupNumber,
        ProjectField::EventExecutorAssociate,
        ProjectField::EventType,
        ProjectField::EventDate,
    ];

    /// Column header as it appears in the uploaded file.
    pub fn column(self) -> &'static str {
        match self {
            ProjectField::ProjectName => "Project Name",
            ProjectField::ProjectStartDate => "Project Start Date",
            ProjectField::Geoscope => "Project Geoscope",
            ProjectField::Industry => "Project Industry",
            ProjectField::ProjectManager => "Project Manager",
            ProjectField::ProjectAssociates => "Project Associates",
            ProjectField::ProjectDemand => "Project Demand",
            ProjectField::ClientName => "Client Name",
            ProjectField::ProjectType => "Project Type",
            ProjectField::ExpertName => "Expert Name",
            ProjectField::ExpertTermsState => "Expert Final Terms State",
            ProjectField::ExpertInteractionState => "Expert Final Interaction State",
            ProjectField::FollowupNumber => "Expert Final Outreach/Followup Number",
            ProjectField::EventExecutorAssociate => "Event Executor Associate",
            ProjectField::EventType => "Event Type",
            ProjectField::EventDate => "Event Date",
        }
    }

    pub fn value(self, record: &ProjectRecord) -> &str {
        match self {
            ProjectField::ProjectName => &record.project_name,
            ProjectField::ProjectStartDate => &record.project_start_date,
            ProjectField::Geoscope => &record.geoscope,
            ProjectField::Industry => &record.industry,
            ProjectField::ProjectManager => &record.project_manager,
            ProjectField::ProjectAssociates => &record.project_associates,
            ProjectField::ProjectDemand => &record.project_demand,
            ProjectField::ClientName => &record.client_name,
            ProjectField::ProjectType => &record.project_type,
            ProjectField::ExpertName => &record.expert_name,
            ProjectField::ExpertTermsState => &record.expert_terms_state,
            ProjectField::ExpertInteractionState => &record.expert_interaction_state,
            ProjectField::FollowupNumber => &record.followup_number,
            ProjectField::EventExecutorAssociate => &record.event_executor_associate,
            ProjectField::EventType => &record.event_type,
            ProjectField::EventDate => &record.event_date,
        }
    }
}

impl FromStr for ProjectField {
    type Err = String;

    /// Accepts the column header (any case) or the snake_case field name.
    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let wanted = value.trim().to_lowercase().replace('_', " ");
        ProjectField::ALL
            .into_iter()
            .find(|field| {
                field.column().to_lowercase() == wanted
                    || format!("{field:?}").to_lowercase() == wanted.replace(' ', "")
            })
            .ok_or_else(|| format!("unknown project field '{value}'"))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClientMetricField {
    ClientName,
    ReticulaCompleted,
    InexOneExpected,
    InexOneCompleted,
    Rate,
}

impl ClientMetricField {
    pub fn column(self) -> &'static str {
        match self {
            ClientMetricField::ClientName => "Client Name",
            ClientMetricField::ReticulaCompleted => "Reticula Completed Calls",
            ClientMetricField::InexOneExpected => "Inex One Expected Calls",
            ClientMetricField::InexOneCompleted => "Inex One Completed Calls",
            ClientMetricField::Rate => "Rate",
        }
    }

    pub fn value(self, record: &ClientMetricRecord) -> &str {
        match self {
            ClientMetricField::ClientName => &record.client_name,
            ClientMetricField::ReticulaCompleted => &record.reticula_completed,
            ClientMetricField::InexOneExpected => &record.inex_one_expected,
            ClientMetricField::InexOneCompleted => &record.inex_one_completed,
            ClientMetricField::Rate => &record.rate,
        }
    }

    pub fn is_numeric(self) -> bool {
        !matches!(self, ClientMetricField::ClientName)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProjectSummary {
    pub total_projects: usize,
    pub unique_clients: usize,
    pub unique_experts: usize,
    pub completed_projects: usize,
    pub completed_rate: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ClientMetricsSummary {
    pub total_clients: usize,
    pub total_reticula_calls: i64,
    pub total_inex_one_expected: i64,
    pub total_inex_one_completed: i64,
    pub average_rate: String,
    pub completion_rate: String,
}

/// A named bucket of a categorical distribution.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryCount {
    pub label: String,
    pub count: usize,
    pub percentage: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FollowupBucket {
    pub followups: u8,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HistogramBin {
    pub lower: f64,
    pub label: String,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FunnelStage {
    pub stage: &'static str,
    pub total_projects: usize,
    pub unique_experts: usize,
    pub unique_clients: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ClientEngagement {
    pub client_name: String,
    pub reticula: usize,
    pub inex_one: usize,
    pub other: usize,
    pub total: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClientRateEntry {
    pub client_name: String,
    pub rate: f64,
    pub reticula_calls: i64,
    pub inex_one_completed: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TimePoint {
    pub date: NaiveDate,
    pub count: usize,
}

/// One entry of a compact top-N distribution, with its share of the group total.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DistributionShare {
    pub label: String,
    pub count: usize,
    pub percentage: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn project_fields_parse_from_header_or_name() {
        assert_eq!("Client Name".parse(), Ok(ProjectField::ClientName));
        assert_eq!("event_date".parse(), Ok(ProjectField::EventDate));
        assert_eq!(
            "expert final outreach/followup number".parse(),
            Ok(ProjectField::FollowupNumber)
        );
        assert!("budget".parse::<ProjectField>().is_err());
    }

    #[test]
    fn only_client_name_sorts_as_text() {
        assert!(!ClientMetricField::ClientName.is_numeric());
        assert!(ClientMetricField::Rate.is_numeric());
        assert_eq!(ClientMetricField::InexOneExpected.column(), "Inex One Expected Calls");
    }
}
