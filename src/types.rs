//! Wire and domain types for the Valoriza Vilhena API
//!
//! The backend is a Strapi headless CMS; collection responses arrive wrapped
//! in a `data` envelope, while users-permissions endpoints (`/users/me`,
//! `/users/:id`, `/auth/local`) return bare objects. Wire field names are the
//! backend's (Portuguese); Rust fields carry English names via serde renames.

use serde::{Deserialize, Serialize};

/// Points awarded for a check-in when the place has no explicit award set.
pub const DEFAULT_PLACE_POINTS: u32 = 10;

/// Client configuration
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Base URL for the Strapi REST API (includes the `/api` prefix)
    pub base_url: String,
    /// Bearer token attached to requests when present
    pub token: Option<String>,
    /// Request timeout in seconds (default: 30)
    pub timeout_secs: u64,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:1337/api".to_string(),
            token: None,
            timeout_secs: 30,
        }
    }
}

/// Strapi single-entity envelope
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Document<T> {
    pub data: T,
}

/// Strapi collection envelope
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Collection<T> {
    #[serde(default = "Vec::new")]
    pub data: Vec<T>,
}

/// Point-of-interest category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Category {
    #[serde(rename = "cultura")]
    Culture,
    #[serde(rename = "gastronomia")]
    Gastronomy,
    #[serde(rename = "historia")]
    History,
    #[serde(rename = "evento")]
    Event,
    #[serde(rename = "turismo")]
    Tourism,
    #[serde(rename = "outro", other)]
    Other,
}

impl Category {
    /// Wire value as stored in the backend
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Culture => "cultura",
            Category::Gastronomy => "gastronomia",
            Category::History => "historia",
            Category::Event => "evento",
            Category::Tourism => "turismo",
            Category::Other => "outro",
        }
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Category {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "cultura" => Ok(Category::Culture),
            "gastronomia" => Ok(Category::Gastronomy),
            "historia" => Ok(Category::History),
            "evento" => Ok(Category::Event),
            "turismo" => Ok(Category::Tourism),
            "outro" => Ok(Category::Other),
            other => Err(format!(
                "unknown category '{}' (expected cultura, gastronomia, historia, evento, turismo, outro)",
                other
            )),
        }
    }
}

/// A point of interest with a scan code and point award.
///
/// Immutable from the client's perspective; owned by the backend.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Place {
    pub id: u64,
    /// Strapi long-lived document id
    #[serde(rename = "documentId", default)]
    pub document_id: Option<String>,
    #[serde(rename = "nome")]
    pub name: String,
    #[serde(rename = "categoria")]
    pub category: Category,
    /// Point award for a check-in; absent means the default applies
    #[serde(rename = "pontuacao", default)]
    pub points: Option<u32>,
    /// Unique external QR scan code
    #[serde(rename = "qr_code_id", default)]
    pub scan_code: Option<String>,
    #[serde(rename = "descricao", default)]
    pub description: Option<String>,
    #[serde(rename = "endereco", default)]
    pub address: Option<String>,
}

impl Place {
    /// Effective check-in award (defaults when unset)
    pub fn award(&self) -> u32 {
        self.points.unwrap_or(DEFAULT_PLACE_POINTS)
    }
}

/// Shallow reference to a place inside a populated relation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlaceRef {
    pub id: u64,
}

/// Shallow reference to a user inside a populated relation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserRef {
    pub id: u64,
}

/// A registered user with accumulated points and today's scans
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: u64,
    pub username: String,
    #[serde(default)]
    pub email: Option<String>,
    /// Accumulated point total; monotonically non-decreasing
    #[serde(rename = "pontos", alias = "pontos_totais", default)]
    pub points: u64,
    /// Places scanned today; reset cadence is owned by the backend
    #[serde(rename = "daily_locals_scanned", default)]
    pub daily_scans: Vec<PlaceRef>,
}

impl User {
    /// Whether the user already scanned the given place today
    pub fn scanned_today(&self, place_id: u64) -> bool {
        self.daily_scans.iter().any(|p| p.id == place_id)
    }
}

/// A rule-gated, one-time-per-user bonus objective
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Mission {
    pub id: u64,
    #[serde(rename = "documentId", default)]
    pub document_id: Option<String>,
    #[serde(rename = "nome")]
    pub name: String,
    /// Point reward for completing the mission
    #[serde(rename = "pontos", default)]
    pub points: u32,
    /// Textual rule expression, e.g. `daily_places_scanned>=5`
    #[serde(default)]
    pub rule: String,
    /// Users who completed this mission (append-only per user)
    #[serde(rename = "users_permissions_users", default)]
    pub completed_by: Vec<UserRef>,
}

impl Mission {
    /// Stable identifier, preferring the long-lived document id
    pub fn key(&self) -> String {
        self.document_id
            .clone()
            .unwrap_or_else(|| self.id.to_string())
    }
}

/// A redeemable reward with a point cost
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Reward {
    pub id: u64,
    #[serde(rename = "documentId", default)]
    pub document_id: Option<String>,
    #[serde(rename = "nome")]
    pub name: String,
    #[serde(rename = "pontos_necessarios", default)]
    pub cost: u64,
    #[serde(rename = "descricao", default)]
    pub description: Option<String>,
}

/// Login request for `/auth/local`
#[derive(Debug, Clone, Serialize)]
pub struct LoginRequest {
    pub identifier: String,
    pub password: String,
}

/// Registration request for `/auth/local/register`
#[derive(Debug, Clone, Serialize)]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
    pub password: String,
}

/// Auth response carrying the bearer token and the user record
#[derive(Debug, Clone, Deserialize)]
pub struct AuthResponse {
    pub jwt: String,
    pub user: User,
}

/// File metadata returned by `/upload`
#[derive(Debug, Clone, Deserialize)]
pub struct UploadedFile {
    pub id: u64,
    pub name: String,
    pub url: String,
}

/// Outcome of a single check-in invocation
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CheckInOutcome {
    /// Total points earned (place award + all mission payouts)
    pub points_earned: u64,
    /// Base place award
    pub place_points: u64,
    /// Sum of mission payouts earned in this call
    pub mission_points: u64,
    /// Names of missions completed in this call
    pub completed_missions: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_place_award_defaults() {
        let json = r#"{"id": 3, "nome": "Mercado Municipal", "categoria": "gastronomia"}"#;
        let place: Place = serde_json::from_str(json).unwrap();
        assert_eq!(place.award(), DEFAULT_PLACE_POINTS);
        assert_eq!(place.category, Category::Gastronomy);

        let json = r#"{"id": 1, "nome": "Parque", "categoria": "turismo", "pontuacao": 50}"#;
        let place: Place = serde_json::from_str(json).unwrap();
        assert_eq!(place.award(), 50);
    }

    #[test]
    fn test_unknown_category_folds_to_other() {
        let json = r#"{"id": 9, "nome": "X", "categoria": "esporte"}"#;
        let place: Place = serde_json::from_str(json).unwrap();
        assert_eq!(place.category, Category::Other);
    }

    #[test]
    fn test_user_points_alias() {
        let json = r#"{"id": 1, "username": "joao.silva", "pontos_totais": 120}"#;
        let user: User = serde_json::from_str(json).unwrap();
        assert_eq!(user.points, 120);
        assert!(user.daily_scans.is_empty());
    }

    #[test]
    fn test_mission_key_prefers_document_id() {
        let with_doc: Mission = serde_json::from_str(
            r#"{"id": 7, "documentId": "abc123", "nome": "M", "pontos": 20, "rule": "visit_new_place"}"#,
        )
        .unwrap();
        assert_eq!(with_doc.key(), "abc123");

        let without: Mission =
            serde_json::from_str(r#"{"id": 7, "nome": "M", "rule": ""}"#).unwrap();
        assert_eq!(without.key(), "7");
    }
}
