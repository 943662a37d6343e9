//! Backend-to-view events and error modeling for the cohorts controller.

use std::fmt;

use shared::domain::{Cohort, CohortName};

use crate::controller::view_model::RequestSeq;

#[derive(Debug, Clone)]
pub enum CohortsEvent {
    CohortsLoaded {
        request: RequestSeq,
        cohorts: Vec<Cohort>,
    },
    CohortsLoadFailed {
        request: RequestSeq,
        error: UiError,
    },
    CohortRemoved {
        name: CohortName,
    },
    CohortRemoveFailed {
        name: CohortName,
        error: UiError,
    },
    Error(UiError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UiErrorContext {
    BackendStartup,
    LoadCohorts,
    RemoveCohort,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UiError {
    context: UiErrorContext,
    message: String,
}

impl UiError {
    pub fn from_message(context: UiErrorContext, message: impl Into<String>) -> Self {
        Self {
            context,
            message: message.into(),
        }
    }

    pub fn context(&self) -> UiErrorContext {
        self.context
    }

    pub fn into_message(self) -> String {
        self.message
    }
}

impl fmt::Display for UiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}
