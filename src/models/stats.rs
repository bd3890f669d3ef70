use serde::{Deserialize, Serialize};

use super::ApplicationStatus;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Totals {
    #[serde(default)]
    pub scholarships: u64,
    #[serde(default)]
    pub applications: u64,
    #[serde(default)]
    pub users: u64,
    #[serde(default)]
    pub reviews: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NamedCount {
    pub name: String,
    pub value: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminStats {
    #[serde(default)]
    pub totals: Totals,
    #[serde(default)]
    pub applications_by_status: Vec<NamedCount>,
}

impl AdminStats {
    pub fn count_for(&self, status: ApplicationStatus) -> u64 {
        self.applications_by_status
            .iter()
            .find(|c| c.name == status.as_str())
            .map_or(0, |c| c.value)
    }
}
