use std::sync::Arc;

use chrono::{Duration, NaiveDate, NaiveDateTime, Timelike, Utc};

use crate::workflows::auth::domain::AdministratorId;
use crate::workflows::recruitment::domain::{
    Choice, ChoiceId, NarrativeQuestion, NarrativeQuestionDraft, QuestionId, Recruitment,
    RecruitmentId, Section, SectionDraft, SectionId, SelectiveQuestion, SelectiveQuestionDraft,
};
use crate::workflows::recruitment::repository::InMemoryRecruitments;
use crate::workflows::recruitment::search::{InMemoryTitleStore, TitleSearchIndex};
use crate::workflows::recruitment::service::{RecruitmentDraft, RecruitmentService};

pub(super) const PUBLISHER: AdministratorId = AdministratorId(77);

/// Fixed reference clock for pure domain tests.
pub(super) fn fixed_now() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2025, 9, 1)
        .expect("valid date")
        .and_hms_opt(10, 0, 0)
        .expect("valid time")
}

/// Hour-aligned deadline relative to the real clock, for service calls that
/// validate against `Utc::now()` internally.
pub(super) fn upcoming_deadline(hours: i64) -> NaiveDateTime {
    let now = Utc::now().naive_utc();
    let top_of_hour = now
        .date()
        .and_hms_opt(now.hour(), 0, 0)
        .expect("valid time");
    top_of_hour + Duration::hours(hours)
}

pub(super) fn section_draft(name: &str) -> SectionDraft {
    SectionDraft {
        name: name.to_string(),
        narrative_questions: vec![NarrativeQuestionDraft {
            content: format!("Tell us about your {name} experience"),
            required: true,
            word_limit: Some(500),
        }],
        selective_questions: vec![SelectiveQuestionDraft {
            content: "Preferred stack?".to_string(),
            required: true,
            minimum_selection: 1,
            maximum_selection: 2,
            choices: vec![
                "Rust".to_string(),
                "Kotlin".to_string(),
                "TypeScript".to_string(),
            ],
        }],
    }
}

pub(super) fn draft(title: &str) -> RecruitmentDraft {
    RecruitmentDraft {
        title: title.to_string(),
        description: format!("{title} autumn recruitment"),
        deadline: upcoming_deadline(48),
        sections: vec![section_draft("Backend"), section_draft("Frontend")],
    }
}

/// Pre-built owned section for direct aggregate construction; the ids and
/// back-references are deliberately stale so ownership rewiring is visible.
pub(super) fn stale_section(id: u64) -> Section {
    let section_id = SectionId(id);
    let narrative_id = QuestionId(id * 10 + 1);
    let selective_id = QuestionId(id * 10 + 2);
    Section {
        id: section_id,
        recruitment_id: RecruitmentId(9_999),
        name: format!("Section {id}"),
        narrative_questions: vec![NarrativeQuestion {
            id: narrative_id,
            section_id: SectionId(9_999),
            content: "Why us?".to_string(),
            required: true,
            word_limit: None,
        }],
        selective_questions: vec![SelectiveQuestion {
            id: selective_id,
            section_id: SectionId(9_999),
            content: "Pick one".to_string(),
            required: false,
            minimum_selection: 1,
            maximum_selection: 1,
            choices: vec![Choice {
                id: ChoiceId(id * 100),
                question_id: QuestionId(9_999),
                content: "Either".to_string(),
            }],
        }],
    }
}

pub(super) fn ready_recruitment(id: u64, title: &str) -> Recruitment {
    let now = fixed_now();
    Recruitment::new(
        RecruitmentId(id),
        format!("crew-{id:06}"),
        title.to_string(),
        "fixture".to_string(),
        now + Duration::hours(48),
        PUBLISHER,
        vec![stale_section(1)],
        now,
    )
    .expect("valid fixture recruitment")
}

pub(super) type Service = RecruitmentService<InMemoryRecruitments, InMemoryTitleStore>;

pub(super) fn build_service() -> (
    Arc<Service>,
    Arc<InMemoryRecruitments>,
    Arc<TitleSearchIndex<InMemoryTitleStore>>,
) {
    let repository = Arc::new(InMemoryRecruitments::default());
    let index = Arc::new(TitleSearchIndex::new(InMemoryTitleStore::default()));
    let service = Arc::new(RecruitmentService::new(repository.clone(), index.clone()));
    (service, repository, index)
}
