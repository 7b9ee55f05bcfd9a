use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::{NaiveDateTime, Utc};
use serde::Deserialize;
use tracing::warn;

use super::domain::{
    Choice, ChoiceId, NarrativeQuestion, QuestionId, Recruitment, RecruitmentId, RewriteError,
    Section, SectionDraft, SectionId, SelectiveQuestion, ValidationError,
};
use super::repository::{RecruitmentRepository, RepositoryError};
use super::search::{SearchStoreError, TitleIndexStore, TitleSearchIndex};
use crate::workflows::auth::domain::AdministratorId;
use crate::workflows::recruitment::domain::InvalidStateError;

static RECRUITMENT_SEQUENCE: AtomicU64 = AtomicU64::new(1);
static NODE_SEQUENCE: AtomicU64 = AtomicU64::new(1);

fn next_recruitment_id() -> RecruitmentId {
    RecruitmentId(RECRUITMENT_SEQUENCE.fetch_add(1, Ordering::Relaxed))
}

fn next_node_id() -> u64 {
    NODE_SEQUENCE.fetch_add(1, Ordering::Relaxed)
}

/// Join code applicants use at login to address the recruitment.
fn generate_code(id: RecruitmentId) -> String {
    format!("crew-{:06x}", id.0 ^ 0x5f3759)
}

/// Incoming shape of a create/update request before the aggregate takes
/// ownership of the subtree.
#[derive(Debug, Clone, Deserialize)]
pub struct RecruitmentDraft {
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub deadline: NaiveDateTime,
    #[serde(default)]
    pub sections: Vec<SectionDraft>,
}

/// Guards state transitions and aggregate mutation, and keeps the title
/// index written through alongside the store.
pub struct RecruitmentService<R, S> {
    repository: Arc<R>,
    index: Arc<TitleSearchIndex<S>>,
}

/// Error raised by the recruitment service.
#[derive(Debug, thiserror::Error)]
pub enum RecruitmentServiceError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    InvalidState(#[from] InvalidStateError),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
    #[error(transparent)]
    Search(#[from] SearchStoreError),
    #[error("administrator {actor} is not the publisher of recruitment {recruitment}")]
    NotPublisher {
        actor: AdministratorId,
        recruitment: RecruitmentId,
    },
}

impl From<RewriteError> for RecruitmentServiceError {
    fn from(value: RewriteError) -> Self {
        match value {
            RewriteError::Validation(err) => Self::Validation(err),
            RewriteError::InvalidState(err) => Self::InvalidState(err),
        }
    }
}

impl<R, S> RecruitmentService<R, S>
where
    R: RecruitmentRepository + 'static,
    S: TitleIndexStore + 'static,
{
    pub fn new(repository: Arc<R>, index: Arc<TitleSearchIndex<S>>) -> Self {
        Self { repository, index }
    }

    /// Creates a new recruitment in `Ready` with ownership of the drafted
    /// subtree, then writes its title through to the search index.
    pub fn create(
        &self,
        publisher: AdministratorId,
        draft: RecruitmentDraft,
    ) -> Result<Recruitment, RecruitmentServiceError> {
        let now = Utc::now().naive_utc();
        let id = next_recruitment_id();
        let sections = build_sections(draft.sections);
        let recruitment = Recruitment::new(
            id,
            generate_code(id),
            draft.title,
            draft.description,
            draft.deadline,
            publisher,
            sections,
            now,
        )?;

        let stored = self.repository.insert(recruitment)?;
        self.index_title(&stored.title);
        Ok(stored)
    }

    /// Rewrites the form while it is still `Ready`. The prior subtree is
    /// discarded and the new one installed as a single atomic replacement.
    pub fn update(
        &self,
        actor: AdministratorId,
        id: RecruitmentId,
        draft: RecruitmentDraft,
    ) -> Result<Recruitment, RecruitmentServiceError> {
        let now = Utc::now().naive_utc();
        let mut recruitment = self.fetch_owned(actor, id)?;

        let sections = build_sections(draft.sections);
        recruitment.rewrite(draft.title, draft.description, draft.deadline, sections, now)?;

        self.repository.update(recruitment.clone())?;
        self.index_title(&recruitment.title);
        Ok(recruitment)
    }

    pub fn start(
        &self,
        actor: AdministratorId,
        id: RecruitmentId,
    ) -> Result<Recruitment, RecruitmentServiceError> {
        let mut recruitment = self.fetch_owned(actor, id)?;
        recruitment.start()?;
        self.repository.update(recruitment.clone())?;
        Ok(recruitment)
    }

    pub fn close(
        &self,
        actor: AdministratorId,
        id: RecruitmentId,
    ) -> Result<Recruitment, RecruitmentServiceError> {
        let mut recruitment = self.fetch_owned(actor, id)?;
        recruitment.close()?;
        self.repository.update(recruitment.clone())?;
        Ok(recruitment)
    }

    /// The aggregate with its full owned subtree.
    pub fn details(&self, id: RecruitmentId) -> Result<Recruitment, RecruitmentServiceError> {
        let recruitment = self
            .repository
            .fetch_with_sections(id)?
            .ok_or(RepositoryError::NotFound)?;
        Ok(recruitment)
    }

    pub fn search_titles(
        &self,
        prefix: &str,
        limit: usize,
    ) -> Result<Vec<String>, RecruitmentServiceError> {
        Ok(self.index.find_by_prefix(prefix, limit)?)
    }

    /// Destroys the aggregate and, by ownership, its entire subtree. The
    /// title index entry is left behind; stale entries are resolved at the
    /// detail-fetch step.
    pub fn delete(
        &self,
        actor: AdministratorId,
        id: RecruitmentId,
    ) -> Result<(), RecruitmentServiceError> {
        let recruitment = self.fetch_owned(actor, id)?;
        self.repository.delete(recruitment.id)?;
        Ok(())
    }

    fn fetch_owned(
        &self,
        actor: AdministratorId,
        id: RecruitmentId,
    ) -> Result<Recruitment, RecruitmentServiceError> {
        let recruitment = self
            .repository
            .fetch_with_sections(id)?
            .ok_or(RepositoryError::NotFound)?;
        if !recruitment.is_published_by(actor) {
            return Err(RecruitmentServiceError::NotPublisher {
                actor,
                recruitment: id,
            });
        }
        Ok(recruitment)
    }

    /// Write-through, but not atomic with the store transaction: an index
    /// failure after the store write commits only logs, and the index
    /// converges on the next successful write.
    fn index_title(&self, title: &str) {
        if let Err(err) = self.index.add(title) {
            warn!(%title, error = %err, "title index write failed; index diverges until retried");
        }
    }
}

fn build_sections(drafts: Vec<SectionDraft>) -> Vec<Section> {
    drafts
        .into_iter()
        .map(|draft| {
            let section_id = SectionId(next_node_id());
            Section {
                id: section_id,
                // Back-references are rewritten when the aggregate takes
                // ownership.
                recruitment_id: RecruitmentId(0),
                name: draft.name,
                narrative_questions: draft
                    .narrative_questions
                    .into_iter()
                    .map(|question| NarrativeQuestion {
                        id: QuestionId(next_node_id()),
                        section_id,
                        content: question.content,
                        required: question.required,
                        word_limit: question.word_limit,
                    })
                    .collect(),
                selective_questions: draft
                    .selective_questions
                    .into_iter()
                    .map(|question| {
                        let question_id = QuestionId(next_node_id());
                        SelectiveQuestion {
                            id: question_id,
                            section_id,
                            content: question.content,
                            required: question.required,
                            minimum_selection: question.minimum_selection,
                            maximum_selection: question.maximum_selection,
                            choices: question
                                .choices
                                .into_iter()
                                .map(|content| Choice {
                                    id: ChoiceId(next_node_id()),
                                    question_id,
                                    content,
                                })
                                .collect(),
                        }
                    })
                    .collect(),
            }
        })
        .collect()
}
