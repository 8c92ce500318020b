use crate::types::{HelpRequest, RequestStatus};
use serde::{Deserialize, Serialize};

/// The two disjoint partitions of the supervisor list.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FilterMode {
    #[default]
    Pending,
    Resolved,
}

impl FilterMode {
    pub fn status(self) -> RequestStatus {
        match self {
            Self::Pending => RequestStatus::Pending,
            Self::Resolved => RequestStatus::Resolved,
        }
    }

    pub fn matches(self, request: &HelpRequest) -> bool {
        request.status == self.status()
    }
}

/// Requests of `mode`, newest `created_at` first.
///
/// The sort is stable, so equal timestamps keep their snapshot order and the same
/// snapshot always renders the same way.
pub fn filtered_sorted(requests: &[HelpRequest], mode: FilterMode) -> Vec<HelpRequest> {
    let mut filtered: Vec<HelpRequest> = requests
        .iter()
        .filter(|request| mode.matches(request))
        .cloned()
        .collect();
    filtered.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    filtered
}
