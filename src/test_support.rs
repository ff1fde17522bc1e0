use crate::ingest::synthesize_rate;
use crate::models::{ClientMetricRecord, ProjectRecord};

pub fn project(name: &str, client_name: &str, project_type: &str) -> ProjectRecord {
    ProjectRecord {
        project_name: name.to_string(),
        project_start_date: "2024-01-15".to_string(),
        geoscope: "EMEA".to_string(),
        industry: "Energy".to_string(),
        project_manager: "Dana Whitfield".to_string(),
        project_associates: "Lee Park".to_string(),
        project_demand: "High".to_string(),
        client_name: client_name.to_string(),
        project_type: project_type.to_string(),
        expert_name: format!("Expert for {name}"),
        expert_terms_state: "Signed".to_string(),
        expert_interaction_state: "Scheduled".to_string(),
        followup_number: "1".to_string(),
        event_executor_associate: "Sam Ortiz".to_string(),
        event_type: "Call".to_string(),
        event_date: "2024-01-20".to_string(),
    }
}

pub fn client(
    name: &str,
    reticula_completed: &str,
    inex_one_expected: &str,
    inex_one_completed: &str,
) -> ClientMetricRecord {
    ClientMetricRecord {
        client_name: name.to_string(),
        reticula_completed: reticula_completed.to_string(),
        inex_one_expected: inex_one_expected.to_string(),
        inex_one_completed: inex_one_completed.to_string(),
        rate: synthesize_rate(reticula_completed, inex_one_completed),
    }
}
