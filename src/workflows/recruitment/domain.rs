use std::fmt;

use chrono::{NaiveDateTime, Timelike};
use serde::{Deserialize, Serialize};

use crate::workflows::auth::domain::AdministratorId;

/// Identifier wrapper for recruitment aggregates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RecruitmentId(pub u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SectionId(pub u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct QuestionId(pub u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ChoiceId(pub u64);

impl fmt::Display for RecruitmentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Lifecycle state of a recruitment. Transitions are strictly forward and
/// never skip a step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Progress {
    Ready,
    InProgress,
    Announced,
    Completion,
}

impl Progress {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Ready => "ready",
            Self::InProgress => "in_progress",
            Self::Announced => "announced",
            Self::Completion => "completion",
        }
    }
}

impl fmt::Display for Progress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Deadline constraint violations raised when a recruitment is created or
/// rewritten.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("deadline {0} must be strictly in the future")]
    DeadlineNotInFuture(NaiveDateTime),
    #[error("deadline {0} must fall exactly on the hour")]
    DeadlineNotHourAligned(NaiveDateTime),
}

/// Raised when an operation is attempted outside the progress state that
/// permits it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum InvalidStateError {
    #[error("recruitment is {actual}, but {action} requires {required}")]
    WrongProgress {
        action: &'static str,
        required: Progress,
        actual: Progress,
    },
    #[error("recruitment outcome has already been announced")]
    AlreadyAnnounced,
}

/// The deadline must be strictly in the future and aligned to the top of the
/// hour (minute, second, and sub-second components all zero).
pub fn validate_deadline(deadline: NaiveDateTime, now: NaiveDateTime) -> Result<(), ValidationError> {
    if deadline <= now {
        return Err(ValidationError::DeadlineNotInFuture(deadline));
    }
    if deadline.minute() != 0 || deadline.second() != 0 || deadline.nanosecond() != 0 {
        return Err(ValidationError::DeadlineNotHourAligned(deadline));
    }
    Ok(())
}

/// Aggregate root for a club's recruitment form. Owns its sections, which in
/// turn own their questions and choices; the subtree is always replaced as a
/// unit, never incrementally.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recruitment {
    pub id: RecruitmentId,
    pub code: String,
    pub title: String,
    pub description: String,
    pub progress: Progress,
    pub deadline: NaiveDateTime,
    pub publisher: AdministratorId,
    pub sections: Vec<Section>,
    pub created_at: NaiveDateTime,
}

impl Recruitment {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        id: RecruitmentId,
        code: String,
        title: String,
        description: String,
        deadline: NaiveDateTime,
        publisher: AdministratorId,
        sections: Vec<Section>,
        now: NaiveDateTime,
    ) -> Result<Self, ValidationError> {
        validate_deadline(deadline, now)?;
        let mut recruitment = Self {
            id,
            code,
            title,
            description,
            progress: Progress::Ready,
            deadline,
            publisher,
            sections: Vec::new(),
            created_at: now,
        };
        recruitment.install_sections(sections);
        Ok(recruitment)
    }

    /// Full rewrite of the form: title, description, deadline, and the whole
    /// owned subtree. Permitted only while the recruitment is still `Ready`.
    pub fn rewrite(
        &mut self,
        title: String,
        description: String,
        deadline: NaiveDateTime,
        sections: Vec<Section>,
        now: NaiveDateTime,
    ) -> Result<(), RewriteError> {
        if self.progress != Progress::Ready {
            return Err(InvalidStateError::WrongProgress {
                action: "update",
                required: Progress::Ready,
                actual: self.progress,
            }
            .into());
        }
        validate_deadline(deadline, now)?;

        self.title = title;
        self.description = description;
        self.deadline = deadline;
        self.install_sections(sections);
        Ok(())
    }

    pub fn start(&mut self) -> Result<(), InvalidStateError> {
        if self.progress != Progress::Ready {
            return Err(InvalidStateError::WrongProgress {
                action: "start",
                required: Progress::Ready,
                actual: self.progress,
            });
        }
        self.progress = Progress::InProgress;
        Ok(())
    }

    /// Flips the recruitment to `Announced`. Re-entry is rejected before any
    /// other guard so a second announcement attempt has no side effects.
    pub fn announce(&mut self) -> Result<(), InvalidStateError> {
        if self.is_announced() {
            return Err(InvalidStateError::AlreadyAnnounced);
        }
        if self.progress != Progress::InProgress {
            return Err(InvalidStateError::WrongProgress {
                action: "announce",
                required: Progress::InProgress,
                actual: self.progress,
            });
        }
        self.progress = Progress::Announced;
        Ok(())
    }

    pub fn close(&mut self) -> Result<(), InvalidStateError> {
        if self.progress != Progress::Announced {
            return Err(InvalidStateError::WrongProgress {
                action: "close",
                required: Progress::Announced,
                actual: self.progress,
            });
        }
        self.progress = Progress::Completion;
        Ok(())
    }

    pub fn is_announced(&self) -> bool {
        self.progress == Progress::Announced
    }

    /// Pull-based deadline check; there is no timer or scheduler.
    pub fn has_passed_deadline(&self, now: NaiveDateTime) -> bool {
        now > self.deadline
    }

    pub fn is_published_by(&self, actor: AdministratorId) -> bool {
        self.publisher == actor
    }

    /// Discards the current subtree and installs the new one, rewriting each
    /// child's back-reference to point at this aggregate.
    fn install_sections(&mut self, sections: Vec<Section>) {
        self.sections = sections;
        for section in &mut self.sections {
            section.recruitment_id = self.id;
            for question in &mut section.narrative_questions {
                question.section_id = section.id;
            }
            for question in &mut section.selective_questions {
                question.section_id = section.id;
                for choice in &mut question.choices {
                    choice.question_id = question.id;
                }
            }
        }
    }
}

/// Errors raised by [`Recruitment::rewrite`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum RewriteError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    InvalidState(#[from] InvalidStateError),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Section {
    pub id: SectionId,
    pub recruitment_id: RecruitmentId,
    pub name: String,
    pub narrative_questions: Vec<NarrativeQuestion>,
    pub selective_questions: Vec<SelectiveQuestion>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NarrativeQuestion {
    pub id: QuestionId,
    pub section_id: SectionId,
    pub content: String,
    pub required: bool,
    pub word_limit: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SelectiveQuestion {
    pub id: QuestionId,
    pub section_id: SectionId,
    pub content: String,
    pub required: bool,
    pub minimum_selection: u8,
    pub maximum_selection: u8,
    pub choices: Vec<Choice>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Choice {
    pub id: ChoiceId,
    pub question_id: QuestionId,
    pub content: String,
}

/// Incoming shape of a section before the service assigns identifiers and the
/// aggregate takes ownership.
#[derive(Debug, Clone, Deserialize)]
pub struct SectionDraft {
    pub name: String,
    #[serde(default)]
    pub narrative_questions: Vec<NarrativeQuestionDraft>,
    #[serde(default)]
    pub selective_questions: Vec<SelectiveQuestionDraft>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NarrativeQuestionDraft {
    pub content: String,
    #[serde(default)]
    pub required: bool,
    #[serde(default)]
    pub word_limit: Option<u32>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SelectiveQuestionDraft {
    pub content: String,
    #[serde(default)]
    pub required: bool,
    pub minimum_selection: u8,
    pub maximum_selection: u8,
    pub choices: Vec<String>,
}
