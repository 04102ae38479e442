use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BodyMeasurement {
    pub id: String,
    pub user_id: String,
    pub measured_at: String,
    pub weight_kg: Option<f64>,
    pub body_fat_pct: Option<f64>,
    pub notes: Option<String>,
    pub created_at: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewBodyMeasurement {
    pub id: Option<String>,
    pub user_id: String,
    pub measured_at: String,
    pub weight_kg: Option<f64>,
    pub body_fat_pct: Option<f64>,
    pub notes: Option<String>,
}
