use std::sync::Arc;

use super::domain::{
    Administrator, AdministratorId, Applicant, ApplicantId, AuthenticatedActor, Role,
};
use super::repository::{AdministratorRepository, ApplicantRepository};
use super::token::{TokenError, TokenPair, TokenProvider};
use crate::workflows::applicant::domain::ApplicationId;
use crate::workflows::applicant::repository::ApplicationRepository;
use crate::workflows::recruitment::domain::{Progress, RecruitmentId};
use crate::workflows::recruitment::repository::{RecruitmentRepository, RepositoryError};

/// Login and token-verification workflow. Actor identities are created
/// lazily on first login; the store-level uniqueness constraints (club name,
/// applicant email scoped to a recruitment) keep concurrent first logins
/// from producing duplicates.
pub struct AuthService<Ad, Ap, R, App, T> {
    administrators: Arc<Ad>,
    applicants: Arc<Ap>,
    recruitments: Arc<R>,
    applications: Arc<App>,
    tokens: Arc<T>,
}

#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error(transparent)]
    Repository(#[from] RepositoryError),
    #[error(transparent)]
    Token(#[from] TokenError),
    #[error("credentials do not match the existing {role} identity")]
    BadCredentials { role: Role },
    #[error("token role {actual} is not permitted for {required} operations")]
    WrongRole { required: Role, actual: Role },
    #[error("recruitment code does not match any recruitment")]
    UnknownRecruitmentCode,
    #[error("authenticated subject no longer exists")]
    UnknownSubject,
}

/// Login response for a club administrator. Carries the state of the club's
/// recruitment so the caller can route to the right screen; `Ready` with no
/// id means nothing has been published yet.
#[derive(Debug, Clone)]
pub struct AdminSession {
    pub administrator_id: AdministratorId,
    pub tokens: TokenPair,
    pub recruitment_id: Option<RecruitmentId>,
    pub progress: Progress,
}

#[derive(Debug, Clone)]
pub struct ApplicantSession {
    pub applicant_id: ApplicantId,
    pub tokens: TokenPair,
    pub progress: Progress,
    pub application_id: Option<ApplicationId>,
}

impl<Ad, Ap, R, App, T> AuthService<Ad, Ap, R, App, T>
where
    Ad: AdministratorRepository + 'static,
    Ap: ApplicantRepository + 'static,
    R: RecruitmentRepository + 'static,
    App: ApplicationRepository + 'static,
    T: TokenProvider + 'static,
{
    pub fn new(
        administrators: Arc<Ad>,
        applicants: Arc<Ap>,
        recruitments: Arc<R>,
        applications: Arc<App>,
        tokens: Arc<T>,
    ) -> Self {
        Self {
            administrators,
            applicants,
            recruitments,
            applications,
            tokens,
        }
    }

    pub fn login_admin(&self, club_name: &str, password: &str) -> Result<AdminSession, AuthError> {
        let administrator = self.get_or_create_admin(club_name, password)?;
        let tokens = self.tokens.issue(Role::Admin, club_name)?;

        let recruitment = self.recruitments.find_by_publisher(administrator.id)?;
        let recruitment_id = recruitment.as_ref().map(|recruitment| recruitment.id);
        let progress = recruitment
            .map(|recruitment| recruitment.progress)
            .unwrap_or(Progress::Ready);

        Ok(AdminSession {
            administrator_id: administrator.id,
            tokens,
            recruitment_id,
            progress,
        })
    }

    pub fn login_applicant(
        &self,
        email: &str,
        password: &str,
        recruitment_code: &str,
    ) -> Result<ApplicantSession, AuthError> {
        let recruitment = self
            .recruitments
            .find_by_code(recruitment_code)?
            .ok_or(AuthError::UnknownRecruitmentCode)?;

        let applicant = self.get_or_create_applicant(email, password, recruitment.id)?;
        let application_id = self
            .applications
            .find_by_applicant(applicant.id)?
            .map(|application| application.id);
        let tokens = self.tokens.issue(Role::Applicant, email)?;

        Ok(ApplicantSession {
            applicant_id: applicant.id,
            tokens,
            progress: recruitment.progress,
            application_id,
        })
    }

    pub fn authenticate_admin(&self, access_token: &str) -> Result<AuthenticatedActor, AuthError> {
        let claims = self.tokens.verify(access_token)?;
        if claims.role != Role::Admin {
            return Err(AuthError::WrongRole {
                required: Role::Admin,
                actual: claims.role,
            });
        }
        let administrator = self
            .administrators
            .find_by_club_name(&claims.subject)?
            .ok_or(AuthError::UnknownSubject)?;
        Ok(AuthenticatedActor {
            id: administrator.id.0,
            role: Role::Admin,
        })
    }

    pub fn authenticate_applicant(
        &self,
        access_token: &str,
    ) -> Result<AuthenticatedActor, AuthError> {
        let claims = self.tokens.verify(access_token)?;
        if claims.role != Role::Applicant {
            return Err(AuthError::WrongRole {
                required: Role::Applicant,
                actual: claims.role,
            });
        }
        let applicant = self
            .applicants
            .find_by_email(&claims.subject)?
            .ok_or(AuthError::UnknownSubject)?;
        Ok(AuthenticatedActor {
            id: applicant.id.0,
            role: Role::Applicant,
        })
    }

    pub fn refresh(&self, refresh_token: &str) -> Result<String, AuthError> {
        Ok(self.tokens.refresh(refresh_token)?)
    }

    fn get_or_create_admin(
        &self,
        club_name: &str,
        password: &str,
    ) -> Result<Administrator, AuthError> {
        if let Some(existing) = self.administrators.find_by_club_name(club_name)? {
            return verify_password(existing.password == password, existing, Role::Admin);
        }
        match self.administrators.insert(club_name, password) {
            Ok(created) => Ok(created),
            // Lost a race with a concurrent first login; the winner's
            // identity is authoritative.
            Err(RepositoryError::Conflict) => {
                let existing = self
                    .administrators
                    .find_by_club_name(club_name)?
                    .ok_or(AuthError::UnknownSubject)?;
                verify_password(existing.password == password, existing, Role::Admin)
            }
            Err(err) => Err(err.into()),
        }
    }

    fn get_or_create_applicant(
        &self,
        email: &str,
        password: &str,
        recruitment_id: RecruitmentId,
    ) -> Result<Applicant, AuthError> {
        if let Some(existing) = self
            .applicants
            .find_by_email_and_recruitment(email, recruitment_id)?
        {
            return verify_password(existing.password == password, existing, Role::Applicant);
        }
        match self.applicants.insert(email, password, recruitment_id) {
            Ok(created) => Ok(created),
            Err(RepositoryError::Conflict) => {
                let existing = self
                    .applicants
                    .find_by_email_and_recruitment(email, recruitment_id)?
                    .ok_or(AuthError::UnknownSubject)?;
                verify_password(existing.password == password, existing, Role::Applicant)
            }
            Err(err) => Err(err.into()),
        }
    }
}

fn verify_password<A>(matches: bool, identity: A, role: Role) -> Result<A, AuthError> {
    if matches {
        Ok(identity)
    } else {
        Err(AuthError::BadCredentials { role })
    }
}
