use serde::{Deserialize, Serialize};

/// A named equipment set. At most one gym per user is active at a time; the
/// equipment list is a JSON column at rest.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Gym {
    pub id: String,
    pub user_id: String,
    pub name: String,
    pub equipment: Vec<String>,
    pub is_active: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewGym {
    pub id: Option<String>,
    pub user_id: String,
    pub name: String,
    pub equipment: Vec<String>,
}
