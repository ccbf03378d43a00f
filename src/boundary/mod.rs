//! Boundary collaborators.
//!
//! Everything the wizard core needs from the outside world sits behind the
//! traits in this module: slug generation/availability, workspace
//! creation, invitation delivery, and the auth context that keys durable
//! storage. The core never talks to a network or a database directly —
//! production backends and the local implementations in `local` both plug
//! in here.

pub mod local;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::wizard::{InvitationDraft, WizardFormData};

pub use local::{LocalSlugService, RecordingInvitationService, RecordingWorkspaceService, StaticAuth};

/// Authenticated user identity; also the durable-storage key scope.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UserId(String);

impl UserId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for UserId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkspaceId(pub String);

impl std::fmt::Display for WorkspaceId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Failures crossing a boundary. Cloneable so outcomes can be recorded
/// per-item (see `InvitationOutcome`) and still bubbled up.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum BoundaryError {
    #[error("{service} is unavailable: {reason}")]
    Unavailable { service: String, reason: String },

    #[error("request rejected: {reason}")]
    Rejected { reason: String },
}

/// Supplies the current user's identity and a readiness flag. The wizard
/// must not touch durable state before readiness is known.
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
pub trait AuthContext: Send + Sync {
    fn is_ready(&self) -> bool;

    fn current_user(&self) -> Option<UserId>;
}

/// Derive a URL slug from a workspace name: lowercase, runs of anything
/// that is not a letter or digit collapse to single hyphens, leading and
/// trailing hyphens trimmed.
pub fn slugify(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    let mut pending_hyphen = false;
    for c in name.chars() {
        if c.is_ascii_alphanumeric() {
            if pending_hyphen && !slug.is_empty() {
                slug.push('-');
            }
            pending_hyphen = false;
            slug.push(c.to_ascii_lowercase());
        } else {
            pending_hyphen = true;
        }
    }
    slug
}

/// Workspace URL slug collaborator.
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait]
pub trait SlugService: Send + Sync {
    /// Propose a slug for a workspace name.
    fn generate_slug(&self, name: &str) -> String {
        slugify(name)
    }

    /// Whether the slug is free to claim. A taken slug is a field-level
    /// condition for the caller, not a fatal error.
    async fn check_availability(&self, slug: &str) -> Result<bool, BoundaryError>;
}

/// The fully-assembled configuration submitted at the end of the flow.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubmissionPayload {
    /// Client-generated key so a retried submission is not applied twice.
    pub idempotency_key: Uuid,
    pub submitted_at: DateTime<Utc>,
    /// All six steps, keyed `step1`..`step6` on the wire.
    #[serde(flatten)]
    pub form_data: WizardFormData,
}

impl SubmissionPayload {
    pub fn new(form_data: WizardFormData) -> Self {
        Self {
            idempotency_key: Uuid::new_v4(),
            submitted_at: Utc::now(),
            form_data,
        }
    }
}

/// Workspace creation boundary.
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait]
pub trait WorkspaceService: Send + Sync {
    async fn create_workspace(&self, payload: &SubmissionPayload)
        -> Result<WorkspaceId, BoundaryError>;
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "status")]
pub enum InvitationStatus {
    Sent,
    Failed { reason: String },
}

/// Per-invitation delivery result. Partial failure is reported item by
/// item, never collapsed into one aggregate pass/fail.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvitationOutcome {
    pub email: String,
    pub status: InvitationStatus,
}

impl InvitationOutcome {
    pub fn sent(&self) -> bool {
        matches!(self.status, InvitationStatus::Sent)
    }
}

/// Invitation delivery boundary.
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait]
pub trait InvitationService: Send + Sync {
    async fn send_invitations(
        &self,
        workspace: &WorkspaceId,
        invitations: &[InvitationDraft],
    ) -> Result<Vec<InvitationOutcome>, BoundaryError>;
}
