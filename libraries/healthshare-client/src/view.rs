//! Profile view state machine.
//!
//! ```text
//! Loading ──► Viewing | ProfileMissing | LoadFailed | SignedOut
//! Viewing ⇄ Editing ──► Saving ──► Viewing | Editing (with error)
//! any ──► Unmounted (teardown)
//! ```
//!
//! At most one request is in flight per view. Every request is bounded by
//! the view timeout and aborted on teardown; an aborted request never
//! touches view state.

use crate::api::ProfileApi;
use crate::error::{ClientError, Result};
use crate::types::DEFAULT_TIMEOUT;
use healthshare_core::{ProfileUpdate, UserId, UserProfile};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{Mutex, MutexGuard};
use tokio_util::sync::CancellationToken;
use tracing::debug;

/// Editable copy of the profile fields
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProfileDraft {
    pub name: String,
    pub role: String,
    pub bio: String,
    pub avatar_url: String,
    pub theme: String,
}

impl ProfileDraft {
    pub fn from_profile(profile: &UserProfile) -> Self {
        Self {
            name: profile.name.clone(),
            role: profile.role.as_str().to_string(),
            bio: profile.bio.clone(),
            avatar_url: profile.avatar_url.clone(),
            theme: profile.preferences.theme.as_str().to_string(),
        }
    }

    /// Fields that differ from `base`, as a merge update
    pub fn changes_from(&self, base: &ProfileDraft) -> ProfileUpdate {
        let mut update = ProfileUpdate::default();
        if self.name != base.name {
            update = update.name(self.name.clone());
        }
        if self.role != base.role {
            update = update.role(self.role.clone());
        }
        if self.bio != base.bio {
            update = update.bio(self.bio.clone());
        }
        if self.avatar_url != base.avatar_url {
            update = update.avatar_url(self.avatar_url.clone());
        }
        if self.theme != base.theme {
            update = update.theme(self.theme.clone());
        }
        update
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViewState {
    Loading,
    Viewing(UserProfile),
    /// Signed in, but no profile stored yet
    ProfileMissing,
    LoadFailed(String),
    SignedOut,
    Editing {
        /// Baseline the draft is compared against
        profile: UserProfile,
        draft: ProfileDraft,
        error: Option<String>,
    },
    Saving {
        profile: UserProfile,
        draft: ProfileDraft,
    },
    Unmounted,
}

impl ViewState {
    pub fn label(&self) -> &'static str {
        match self {
            ViewState::Loading => "loading",
            ViewState::Viewing(_) => "viewing",
            ViewState::ProfileMissing => "profile missing",
            ViewState::LoadFailed(_) => "load failed",
            ViewState::SignedOut => "signed out",
            ViewState::Editing { .. } => "editing",
            ViewState::Saving { .. } => "saving",
            ViewState::Unmounted => "unmounted",
        }
    }
}

struct Inner {
    state: ViewState,
    uid: Option<UserId>,
    /// A profile fetch is in flight
    loading: bool,
}

/// Aborts in-flight requests and unmounts the view
#[derive(Clone)]
pub struct TeardownHandle {
    cancel: CancellationToken,
}

impl TeardownHandle {
    pub fn teardown(&self) {
        self.cancel.cancel();
    }
}

/// Client-side profile screen
#[derive(Clone)]
pub struct ProfileView {
    api: Arc<dyn ProfileApi>,
    inner: Arc<Mutex<Inner>>,
    cancel: CancellationToken,
    timeout: Duration,
}

impl ProfileView {
    pub fn new(api: Arc<dyn ProfileApi>) -> Self {
        Self {
            api,
            inner: Arc::new(Mutex::new(Inner {
                state: ViewState::Loading,
                uid: None,
                loading: false,
            })),
            cancel: CancellationToken::new(),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn teardown_handle(&self) -> TeardownHandle {
        TeardownHandle {
            cancel: self.cancel.clone(),
        }
    }

    pub fn teardown(&self) {
        self.cancel.cancel();
    }

    pub async fn state(&self) -> ViewState {
        if self.cancel.is_cancelled() {
            return ViewState::Unmounted;
        }
        self.inner.lock().await.state.clone()
    }

    async fn lock(&self) -> Result<MutexGuard<'_, Inner>> {
        if self.cancel.is_cancelled() {
            return Err(ClientError::Cancelled);
        }
        let guard = self.inner.lock().await;
        if self.cancel.is_cancelled() {
            return Err(ClientError::Cancelled);
        }
        Ok(guard)
    }

    /// Run a request under the view timeout, aborting on teardown
    async fn bounded<T>(&self, request: impl Future<Output = Result<T>>) -> Result<T> {
        tokio::select! {
            () = self.cancel.cancelled() => Err(ClientError::Cancelled),
            result = tokio::time::timeout(self.timeout, request) => match result {
                Ok(inner) => inner,
                Err(_) => Err(ClientError::Timeout),
            },
        }
    }

    /// Load the profile of the signed-in user.
    ///
    /// With no active identity the view moves to `SignedOut` without a
    /// request. A load failure leaves the view in `LoadFailed` and is also
    /// returned. Refused while a load or save is in flight, and while a
    /// draft is open.
    pub async fn mount(&self, uid: Option<UserId>) -> Result<()> {
        let mut inner = self.lock().await?;
        match inner.state {
            ViewState::Saving { .. } => return Err(ClientError::Busy),
            ViewState::Loading if inner.loading => return Err(ClientError::Busy),
            ViewState::Editing { .. } => return Err(ClientError::InvalidState("editing")),
            _ => {}
        }

        let Some(uid) = uid else {
            inner.uid = None;
            inner.state = ViewState::SignedOut;
            return Ok(());
        };

        inner.uid = Some(uid.clone());
        inner.state = ViewState::Loading;
        inner.loading = true;
        drop(inner);

        debug!(uid = %uid, "Loading profile");
        let result = self.bounded(self.api.fetch_profile(&uid)).await;

        let mut inner = self.lock().await?;
        inner.loading = false;
        match result {
            Ok(Some(profile)) => {
                inner.state = ViewState::Viewing(profile);
                Ok(())
            }
            Ok(None) => {
                inner.state = ViewState::ProfileMissing;
                Ok(())
            }
            Err(e) => {
                inner.state = ViewState::LoadFailed(e.to_string());
                Err(e)
            }
        }
    }

    pub async fn begin_edit(&self) -> Result<()> {
        let mut inner = self.lock().await?;
        match &inner.state {
            ViewState::Viewing(profile) => {
                let profile = profile.clone();
                inner.state = ViewState::Editing {
                    draft: ProfileDraft::from_profile(&profile),
                    profile,
                    error: None,
                };
                Ok(())
            }
            ViewState::Saving { .. } => Err(ClientError::Busy),
            other => Err(ClientError::InvalidState(other.label())),
        }
    }

    /// Discard the draft and return to the last loaded record
    pub async fn cancel_edit(&self) -> Result<()> {
        let mut inner = self.lock().await?;
        match &inner.state {
            ViewState::Editing { profile, .. } => {
                inner.state = ViewState::Viewing(profile.clone());
                Ok(())
            }
            ViewState::Saving { .. } => Err(ClientError::Busy),
            other => Err(ClientError::InvalidState(other.label())),
        }
    }

    /// Modify the draft; only accepted while editing
    pub async fn edit(&self, change: impl FnOnce(&mut ProfileDraft)) -> Result<()> {
        let mut inner = self.lock().await?;
        match &mut inner.state {
            ViewState::Editing { draft, error, .. } => {
                change(draft);
                *error = None;
                Ok(())
            }
            ViewState::Saving { .. } => Err(ClientError::Busy),
            other => Err(ClientError::InvalidState(other.label())),
        }
    }

    /// Send the changed fields and adopt the server's merged record.
    ///
    /// On failure the view returns to `Editing` with the draft intact and the
    /// error recorded. Nothing is retried.
    pub async fn submit(&self) -> Result<()> {
        let mut inner = self.lock().await?;
        let (profile, draft) = match &inner.state {
            ViewState::Editing { profile, draft, .. } => (profile.clone(), draft.clone()),
            ViewState::Saving { .. } => return Err(ClientError::Busy),
            other => return Err(ClientError::InvalidState(other.label())),
        };
        let uid = inner
            .uid
            .clone()
            .ok_or(ClientError::InvalidState("signed out"))?;

        let update = draft.changes_from(&ProfileDraft::from_profile(&profile));
        if update.is_empty() {
            inner.state = ViewState::Viewing(profile);
            return Ok(());
        }

        inner.state = ViewState::Saving {
            profile: profile.clone(),
            draft: draft.clone(),
        };
        drop(inner);

        debug!(uid = %uid, "Saving profile");
        let result = self.bounded(self.api.save_profile(&uid, update)).await;

        let mut inner = self.lock().await?;
        match result {
            Ok(saved) => {
                inner.state = ViewState::Viewing(saved);
                Ok(())
            }
            Err(e) => {
                inner.state = ViewState::Editing {
                    profile,
                    draft,
                    error: Some(e.to_string()),
                };
                Err(e)
            }
        }
    }
}
