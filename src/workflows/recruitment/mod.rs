//! Recruitment aggregate lifecycle and title prefix search.
//!
//! The aggregate owns its whole section/question/choice subtree and is
//! persisted as one unit; the title index is written through alongside the
//! store so autocomplete stays in step with published forms.

pub mod domain;
pub mod repository;
pub mod router;
pub mod search;
pub mod service;

#[cfg(test)]
mod tests;

pub use domain::{
    Choice, ChoiceId, InvalidStateError, NarrativeQuestion, NarrativeQuestionDraft, Progress,
    QuestionId, Recruitment, RecruitmentId, Section, SectionDraft, SectionId, SelectiveQuestion,
    SelectiveQuestionDraft, ValidationError,
};
pub use repository::{InMemoryRecruitments, RecruitmentRepository, RepositoryError};
pub use router::recruitment_router;
pub use search::{InMemoryTitleStore, SearchStoreError, TitleIndexStore, TitleSearchIndex};
pub use service::{RecruitmentDraft, RecruitmentService, RecruitmentServiceError};
