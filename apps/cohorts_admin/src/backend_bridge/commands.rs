//! Backend commands queued from the view-model to the service worker.

use shared::{domain::CohortName, protocol::CohortQuery};

use crate::controller::view_model::RequestSeq;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BackendCommand {
    FetchCohorts {
        request: RequestSeq,
        query: Option<CohortQuery>,
    },
    RemoveCohort {
        name: CohortName,
    },
}

impl BackendCommand {
    pub fn name(&self) -> &'static str {
        match self {
            BackendCommand::FetchCohorts { .. } => "fetch_cohorts",
            BackendCommand::RemoveCohort { .. } => "remove_cohort",
        }
    }
}
