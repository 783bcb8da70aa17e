//! Team and user models.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// A member row as carried in a team roster.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
#[serde(deny_unknown_fields)]
pub struct TeamMember {
    pub user_id: Uuid,
    pub username: String,
    pub is_active: bool,
}

/// A team and its current members.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Team {
    /// Unique business key.
    #[serde(rename = "team_name")]
    pub name: String,
    pub members: Vec<TeamMember>,
}

/// A user with its team resolved to a name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, FromRow)]
pub struct User {
    pub user_id: Uuid,
    pub username: String,
    /// `None` when the user belongs to no team.
    pub team_name: Option<String>,
    pub is_active: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_team_json_uses_team_name_key() {
        let team = Team {
            name: "backend".to_string(),
            members: vec![],
        };
        let json = serde_json::to_string(&team).unwrap();
        assert_eq!(json, r#"{"team_name":"backend","members":[]}"#);
    }
}
