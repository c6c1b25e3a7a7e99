//! Shared request/response bodies for the bracket generation API, the report
//! document printed by the external generator, and the 64-team field.

use serde::{Deserialize, Serialize};

pub mod roster;
pub mod selection;

pub use roster::{roster, Region, Team, FIELD_SIZE, TEAMS_PER_REGION};
pub use selection::{SelectionError, TeamSelection, MAX_SELECTED_TEAMS};

/// Team identifiers travel as plain JSON integers.
pub type TeamId = i64;

pub const GENERATE_BRACKET_PATH: &str = "/api/generate-bracket";
pub const TEAMS_PATH: &str = "/api/teams";

/// Minimal team descriptor carried by a generation request. Any other fields a
/// UI attaches (name, region, seed) are ignored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeamDescriptor {
    pub id: TeamId,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateBracketRequest {
    pub selected_teams: Vec<TeamDescriptor>,
}

impl GenerateBracketRequest {
    pub fn from_ids(ids: &[TeamId]) -> Self {
        Self {
            selected_teams: ids.iter().map(|&id| TeamDescriptor { id }).collect(),
        }
    }

    pub fn team_ids(&self) -> Vec<TeamId> {
        self.selected_teams.iter().map(|team| team.id).collect()
    }
}

/// Body returned by `POST /api/generate-bracket`, for every status code.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateBracketResponse {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bracket_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub champion: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl GenerateBracketResponse {
    pub fn generated(
        bracket_url: impl Into<String>,
        champion: Option<String>,
        message: Option<String>,
    ) -> Self {
        Self {
            success: true,
            bracket_url: Some(bracket_url.into()),
            champion,
            message,
            error: None,
        }
    }

    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            success: false,
            error: Some(error.into()),
            ..Self::default()
        }
    }
}

/// The single JSON document an external generator prints on stdout.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneratorReport {
    pub success: bool,
    #[serde(default)]
    pub champion: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn request_uses_camel_case_wire_names() {
        let request = GenerateBracketRequest::from_ids(&[5, 12]);
        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(value, json!({"selectedTeams": [{"id": 5}, {"id": 12}]}));
    }

    #[test]
    fn request_ignores_extra_descriptor_fields() {
        let request: GenerateBracketRequest = serde_json::from_value(json!({
            "selectedTeams": [{"id": 3, "name": "Team 3", "region": "East", "seed": 3}]
        }))
        .unwrap();
        assert_eq!(request.team_ids(), vec![3]);
    }

    #[test]
    fn success_response_omits_error_field() {
        let body = GenerateBracketResponse::generated(
            "/tournament_bracket.html",
            Some("Team 5".into()),
            None,
        );
        let value = serde_json::to_value(&body).unwrap();
        assert_eq!(
            value,
            json!({
                "success": true,
                "bracketUrl": "/tournament_bracket.html",
                "champion": "Team 5"
            })
        );
    }

    #[test]
    fn generator_report_tolerates_missing_fields() {
        let report: GeneratorReport = serde_json::from_str(r#"{"success":true}"#).unwrap();
        assert!(report.success);
        assert!(report.champion.is_none());
        assert!(report.message.is_none());
    }

    #[test]
    fn generator_report_requires_success_marker() {
        assert!(serde_json::from_str::<GeneratorReport>(r#"{"champion":"Team 1"}"#).is_err());
    }
}
