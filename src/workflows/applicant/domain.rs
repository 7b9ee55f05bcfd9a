use std::fmt;

use serde::{Deserialize, Serialize};

use crate::workflows::auth::domain::ApplicantId;
use crate::workflows::recruitment::domain::{ChoiceId, QuestionId, RecruitmentId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ApplicationId(pub u64);

impl fmt::Display for ApplicationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Per-application result, set by the publisher before the outcome is
/// announced. The announcer never computes this.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    Pending,
    Pass,
    Fail,
}

impl Outcome {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Pass => "pass",
            Self::Fail => "fail",
        }
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Answer to one question of the recruitment form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum Answer {
    Narrative {
        question_id: QuestionId,
        content: String,
    },
    Selective {
        question_id: QuestionId,
        choice_ids: Vec<ChoiceId>,
    },
}

/// A submitted application. The applicant's email is snapshotted at
/// submission so outcome notification needs no extra identity lookup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Application {
    pub id: ApplicationId,
    pub applicant_id: ApplicantId,
    pub recruitment_id: RecruitmentId,
    pub applicant_email: String,
    pub answers: Vec<Answer>,
    pub outcome: Outcome,
}

impl Application {
    pub fn passed(&self) -> bool {
        self.outcome == Outcome::Pass
    }
}
