use remedy_core::types::{ActorRole, DocumentVersion, Work};
use strum::{Display, IntoStaticStr};
use uuid::Uuid;

/// The first condition a version failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, IntoStaticStr)]
#[strum(serialize_all = "snake_case")]
pub enum Ineligibility {
    /// The deployment has auto-remediation switched off.
    FeatureDisabled,
    /// The version is not its work's latest published version.
    NotLatestPublished,
    /// Remediation was already started for the version.
    AlreadyStarted,
    /// The version already has a remediated output or is one.
    AlreadyRemediated,
    /// The download path cannot trigger remediation.
    DownloadNotCapable,
    /// Administrators never trigger remediation.
    AdminActor,
    /// The work is waiting for a human reviewer.
    UnderManualReview,
}

/// Inputs of the eligibility predicate.
#[derive(Debug, Clone, Copy)]
pub struct EligibilityCheck<'a> {
    /// Deployment feature flag.
    pub auto_remediation_enabled: bool,
    /// The downloaded version.
    pub version: &'a DocumentVersion,
    /// Its parent work.
    pub work: &'a Work,
    /// Id of the work's latest published version, if any.
    pub latest_published_id: Option<Uuid>,
    /// Role of the downloading actor.
    pub actor_role: ActorRole,
    /// Whether the download path can trigger remediation.
    pub remediation_capable: bool,
}

impl EligibilityCheck<'_> {
    /// Returns the first failed condition, or `None` when all hold.
    pub fn evaluate(&self) -> Option<Ineligibility> {
        let version = self.version;

        if !self.auto_remediation_enabled {
            return Some(Ineligibility::FeatureDisabled);
        }
        if !version.is_published() || self.latest_published_id != Some(version.id) {
            return Some(Ineligibility::NotLatestPublished);
        }
        if version.has_remediation_started() {
            return Some(Ineligibility::AlreadyStarted);
        }
        if version.has_remediated_output() || version.is_auto_remediated {
            return Some(Ineligibility::AlreadyRemediated);
        }
        if !self.remediation_capable {
            return Some(Ineligibility::DownloadNotCapable);
        }
        if self.actor_role.is_admin() {
            return Some(Ineligibility::AdminActor);
        }
        if self.work.under_manual_review {
            return Some(Ineligibility::UnderManualReview);
        }

        None
    }

    /// Returns whether every condition holds.
    #[inline]
    pub fn is_eligible(&self) -> bool {
        self.evaluate().is_none()
    }
}
