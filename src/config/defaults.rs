use serde::{Deserialize, Serialize};

pub const ENDPOINT_ENV: &str = "SUPABASE_URL";
pub const API_KEY_ENV: &str = "SUPABASE_ANON_KEY";

/// 預期存在的資料表與欄位
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableExpectation {
    pub table: String,
    #[serde(default)]
    pub columns: Vec<String>,
}

impl TableExpectation {
    pub fn new(table: &str, columns: &[&str]) -> Self {
        Self {
            table: table.to_string(),
            columns: columns.iter().map(|c| c.to_string()).collect(),
        }
    }
}

/// 預期可被嵌入查詢的外鍵關聯（from 表引用 to 表）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelationshipExpectation {
    pub from: String,
    pub to: String,
}

impl RelationshipExpectation {
    pub fn new(from: &str, to: &str) -> Self {
        Self {
            from: from.to_string(),
            to: to.to_string(),
        }
    }

    pub fn label(&self) -> String {
        format!("{} -> {}", self.from, self.to)
    }
}

/// Fallback values handed to the resolver when neither an override nor the
/// environment provides one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigDefaults {
    pub endpoint: String,
    pub api_key: String,
    pub probe_table: String,
    pub timeout_seconds: u64,
    pub tables: Vec<TableExpectation>,
    pub relationships: Vec<RelationshipExpectation>,
    pub remediation: Vec<String>,
}

impl Default for ConfigDefaults {
    fn default() -> Self {
        Self {
            endpoint: "http://127.0.0.1:54321".to_string(),
            api_key: String::new(),
            probe_table: "profiles".to_string(),
            timeout_seconds: 30,
            tables: default_tables(),
            relationships: default_relationships(),
            remediation: default_remediation(),
        }
    }
}

pub fn default_tables() -> Vec<TableExpectation> {
    vec![
        TableExpectation::new("profiles", &["id", "full_name", "role", "created_at"]),
        TableExpectation::new("doctors", &["id", "profile_id", "specialty", "created_at"]),
        TableExpectation::new(
            "appointments",
            &["id", "patient_id", "doctor_id", "scheduled_at", "status"],
        ),
        TableExpectation::new("messages", &["id", "sender_id", "content", "created_at"]),
    ]
}

pub fn default_relationships() -> Vec<RelationshipExpectation> {
    vec![
        RelationshipExpectation::new("appointments", "doctors"),
        RelationshipExpectation::new("appointments", "profiles"),
        RelationshipExpectation::new("messages", "profiles"),
    ]
}

pub fn default_remediation() -> Vec<String> {
    vec![
        format!("Check that {} and {} hold the project URL and anon key", ENDPOINT_ENV, API_KEY_ENV),
        "Check that the backend project is running and not paused".to_string(),
        "Check that the database setup SQL script has been applied".to_string(),
    ]
}
