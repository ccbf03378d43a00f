// Local boundary implementations - in-process collaborators for the CLI
// driver and for tests. They record what crosses the boundary and can be
// programmed to fail, so session behavior under partial failure is
// exercisable without any network.

use std::collections::HashSet;
use std::sync::Mutex;

use async_trait::async_trait;
use tracing::info;

use super::{
    AuthContext, BoundaryError, InvitationOutcome, InvitationStatus, InvitationService,
    SlugService, SubmissionPayload, UserId, WorkspaceId, WorkspaceService,
};
use crate::wizard::InvitationDraft;

/// Fixed auth context: a known user (or none) and a readiness flag.
#[derive(Debug, Clone)]
pub struct StaticAuth {
    user: Option<UserId>,
    ready: bool,
}

impl StaticAuth {
    pub fn signed_in(user_id: impl Into<String>) -> Self {
        Self { user: Some(UserId::new(user_id)), ready: true }
    }

    pub fn signed_out() -> Self {
        Self { user: None, ready: true }
    }

    pub fn not_ready() -> Self {
        Self { user: None, ready: false }
    }
}

impl AuthContext for StaticAuth {
    fn is_ready(&self) -> bool {
        self.ready
    }

    fn current_user(&self) -> Option<UserId> {
        self.user.clone()
    }
}

/// Slug service backed by an in-memory taken-set.
#[derive(Debug, Default)]
pub struct LocalSlugService {
    taken: Mutex<HashSet<String>>,
}

impl LocalSlugService {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark a slug as already claimed.
    pub fn mark_taken(&self, slug: &str) {
        self.taken.lock().expect("slug lock poisoned").insert(slug.to_string());
    }
}

#[async_trait]
impl SlugService for LocalSlugService {
    async fn check_availability(&self, slug: &str) -> Result<bool, BoundaryError> {
        Ok(!self.taken.lock().expect("slug lock poisoned").contains(slug))
    }
}

/// Workspace boundary that records submissions. Claimed slugs become
/// workspace ids; a programmed failure rejects the next creation.
#[derive(Debug, Default)]
pub struct RecordingWorkspaceService {
    created: Mutex<Vec<SubmissionPayload>>,
    fail_next: Mutex<Option<String>>,
}

impl RecordingWorkspaceService {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail_next(&self, reason: &str) {
        *self.fail_next.lock().expect("workspace lock poisoned") = Some(reason.to_string());
    }

    pub fn created(&self) -> Vec<SubmissionPayload> {
        self.created.lock().expect("workspace lock poisoned").clone()
    }
}

#[async_trait]
impl WorkspaceService for RecordingWorkspaceService {
    async fn create_workspace(
        &self,
        payload: &SubmissionPayload,
    ) -> Result<WorkspaceId, BoundaryError> {
        if let Some(reason) = self.fail_next.lock().expect("workspace lock poisoned").take() {
            return Err(BoundaryError::Rejected { reason });
        }
        let id = WorkspaceId(format!("ws-{}", payload.form_data.basics.slug));
        self.created.lock().expect("workspace lock poisoned").push(payload.clone());
        info!(workspace = %id, "workspace created");
        Ok(id)
    }
}

/// Invitation boundary that delivers in-process. Individual addresses can
/// be programmed to fail, producing a mixed per-invitation report.
#[derive(Debug, Default)]
pub struct RecordingInvitationService {
    rejected_emails: Mutex<HashSet<String>>,
    delivered: Mutex<Vec<(WorkspaceId, InvitationDraft)>>,
}

impl RecordingInvitationService {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reject_email(&self, email: &str) {
        self.rejected_emails
            .lock()
            .expect("invitation lock poisoned")
            .insert(email.to_string());
    }

    pub fn delivered(&self) -> Vec<(WorkspaceId, InvitationDraft)> {
        self.delivered.lock().expect("invitation lock poisoned").clone()
    }
}

#[async_trait]
impl InvitationService for RecordingInvitationService {
    async fn send_invitations(
        &self,
        workspace: &WorkspaceId,
        invitations: &[InvitationDraft],
    ) -> Result<Vec<InvitationOutcome>, BoundaryError> {
        let rejected = self.rejected_emails.lock().expect("invitation lock poisoned").clone();
        let mut outcomes = Vec::with_capacity(invitations.len());
        for draft in invitations {
            if rejected.contains(&draft.email) {
                outcomes.push(InvitationOutcome {
                    email: draft.email.clone(),
                    status: InvitationStatus::Failed {
                        reason: "recipient address rejected".to_string(),
                    },
                });
                continue;
            }
            self.delivered
                .lock()
                .expect("invitation lock poisoned")
                .push((workspace.clone(), draft.clone()));
            outcomes.push(InvitationOutcome {
                email: draft.email.clone(),
                status: InvitationStatus::Sent,
            });
        }
        Ok(outcomes)
    }
}
