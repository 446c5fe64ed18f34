//! Product create/edit screen controller.
//!
//! One controller serves both screens. It owns the draft, the per-field
//! errors, the reference lists and the submission lifecycle:
//!
//! ```text
//! Loading -> Idle -> Submitting -> Succeeded
//!    |        ^            |-----> Rejected -+
//!    v        |            '-----> Failed ---+ (error banner clears, back to Idle)
//! LoadFailed  '--------------------------------+
//! ```
//!
//! Timed follow-ups (banner clear, redirect) run on tokio tasks owned by the
//! controller and are aborted when it is dropped.

use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use tracing::{debug, info, warn};

use crate::currency::{BrlCodec, CurrencyCodec, ZeroAmountPolicy};
use crate::error::ApiError;
use crate::form::{FieldEdit, FormState};
use crate::model::{Category, CategoryId, Product, ProductId, Store};
use crate::service::{Navigator, ProductService, ReferenceService, Route, Screen};
use crate::timers::{DelayedActions, TimerSlot};
use crate::validation::{validate, Field, FieldErrors};

pub const MISSING_PRODUCT_ID: &str = "No product id provided for editing";
pub const LOAD_LISTS_FAILED: &str = "Failed to load categories and stores";
pub const LOAD_PRODUCT_FAILED: &str = "Failed to load the product";
pub const CREATE_FAILED: &str = "Failed to create the product. Try again.";
pub const UPDATE_FAILED: &str = "Failed to update the product. Try again.";
pub const CREATED: &str = "Product created successfully!";
pub const UPDATED: &str = "Product updated successfully!";

/// Which screen the controller backs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormMode {
    Create,
    /// Product id taken from the route; `None` when the route had none.
    Edit(Option<ProductId>),
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Phase {
    #[default]
    Loading,
    Idle,
    Submitting,
    Succeeded,
    /// Server rejected specific fields.
    Rejected,
    /// Any other submit failure.
    Failed,
    LoadFailed,
}

impl Phase {
    /// Phases that accept a new submit.
    pub fn can_submit(self) -> bool {
        matches!(self, Phase::Idle | Phase::Rejected | Phase::Failed)
    }

    pub fn shows_form(self) -> bool {
        !matches!(self, Phase::Loading | Phase::LoadFailed)
    }
}

/// Phase plus the global messages. Shared with timer tasks.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Status {
    pub phase: Phase,
    pub success: Option<String>,
    pub error: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FormTimings {
    pub redirect_delay: Duration,
    pub error_clear_delay: Duration,
}

impl Default for FormTimings {
    fn default() -> Self {
        Self {
            redirect_delay: Duration::from_millis(3000),
            error_clear_delay: Duration::from_millis(4000),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum LoadOutcome {
    Ready,
    /// Fatal; a redirect carrying the message is scheduled.
    Failed(String),
}

#[derive(Debug, Clone, PartialEq)]
pub enum SubmitOutcome {
    /// Not in a phase that accepts submits.
    Ignored,
    /// Local rules failed; nothing was sent.
    Invalid(FieldErrors),
    Saved(Product),
    /// Server rejected fields; they are mapped onto the form slots.
    Rejected(FieldErrors),
    Failed(String),
}

fn lock(status: &Mutex<Status>) -> MutexGuard<'_, Status> {
    status.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Puts the phase back to `Idle` if a submit exits without settling it,
/// e.g. when the submit future is dropped mid-request.
struct SubmittingGuard {
    status: Arc<Mutex<Status>>,
}

impl Drop for SubmittingGuard {
    fn drop(&mut self) {
        let mut st = lock(&self.status);
        if st.phase == Phase::Submitting {
            st.phase = Phase::Idle;
        }
    }
}

pub struct ProductForm<A, N> {
    api: A,
    navigator: Arc<N>,
    codec: Box<dyn CurrencyCodec + Send + Sync>,
    zero_policy: ZeroAmountPolicy,
    timings: FormTimings,
    mode: FormMode,
    form: FormState,
    errors: FieldErrors,
    categories: Vec<Category>,
    stores: Vec<Store>,
    status: Arc<Mutex<Status>>,
    timers: DelayedActions,
}

impl<A, N> ProductForm<A, N>
where
    A: ProductService + ReferenceService,
    N: Navigator,
{
    pub fn new(mode: FormMode, api: A, navigator: Arc<N>) -> Self {
        Self {
            api,
            navigator,
            codec: Box::new(BrlCodec::default()),
            zero_policy: ZeroAmountPolicy::default(),
            timings: FormTimings::default(),
            mode,
            form: FormState::default(),
            errors: FieldErrors::default(),
            categories: Vec::new(),
            stores: Vec::new(),
            status: Arc::new(Mutex::new(Status::default())),
            timers: DelayedActions::new(),
        }
    }

    pub fn with_codec(mut self, codec: impl CurrencyCodec + Send + Sync + 'static) -> Self {
        self.codec = Box::new(codec);
        self
    }

    pub fn with_zero_policy(mut self, policy: ZeroAmountPolicy) -> Self {
        self.zero_policy = policy;
        self
    }

    pub fn with_timings(mut self, timings: FormTimings) -> Self {
        self.timings = timings;
        self
    }

    pub fn mode(&self) -> FormMode {
        self.mode
    }

    pub fn form(&self) -> &FormState {
        &self.form
    }

    pub fn field_errors(&self) -> &FieldErrors {
        &self.errors
    }

    pub fn field_error(&self, field: Field) -> Option<&str> {
        self.errors.get(field)
    }

    pub fn categories(&self) -> &[Category] {
        &self.categories
    }

    pub fn stores(&self) -> &[Store] {
        &self.stores
    }

    pub fn category_name(&self, id: CategoryId) -> Option<&str> {
        self.categories.iter().find(|c| c.id == id).map(|c| c.name.as_str())
    }

    pub fn status(&self) -> Status {
        lock(&self.status).clone()
    }

    pub fn phase(&self) -> Phase {
        lock(&self.status).phase
    }

    /// Loads reference lists, plus the product in edit mode, concurrently.
    /// Any failure is fatal: nothing is hydrated and a redirect is scheduled.
    pub async fn mount(&mut self) -> LoadOutcome {
        self.timers.cancel_all();
        self.errors.clear();
        *lock(&self.status) = Status::default();

        let loaded = match self.mode {
            FormMode::Create => {
                tokio::try_join!(self.api.list_categories(), self.api.list_stores())
                    .map(|(categories, stores)| (None, categories, stores))
                    .map_err(|e| e.load_message().unwrap_or(LOAD_LISTS_FAILED).to_string())
            }
            FormMode::Edit(None) => Err(MISSING_PRODUCT_ID.to_string()),
            FormMode::Edit(Some(id)) => tokio::try_join!(
                self.api.fetch_product(id),
                self.api.list_categories(),
                self.api.list_stores()
            )
            .map(|(product, categories, stores)| (Some(product), categories, stores))
            .map_err(|e| e.load_message().unwrap_or(LOAD_PRODUCT_FAILED).to_string()),
        };

        match loaded {
            Ok((product, categories, stores)) => {
                self.categories = categories;
                self.stores = stores;
                self.form = match &product {
                    Some(p) => FormState::from_product(p, &*self.codec, self.zero_policy),
                    None => FormState::default(),
                };
                lock(&self.status).phase = Phase::Idle;
                info!(
                    mode = ?self.mode,
                    categories = self.categories.len(),
                    stores = self.stores.len(),
                    "product form loaded"
                );
                LoadOutcome::Ready
            }
            Err(message) => {
                warn!(mode = ?self.mode, %message, "product form load failed");
                {
                    let mut st = lock(&self.status);
                    st.phase = Phase::LoadFailed;
                    st.error = Some(message.clone());
                }
                self.schedule_redirect(Route::with_error(Screen::Products, message.clone()));
                LoadOutcome::Failed(message)
            }
        }
    }

    /// Applies one field edit. Ignored while the form is not on screen.
    pub fn edit(&mut self, edit: FieldEdit) -> bool {
        let phase = self.phase();
        if !phase.shows_form() {
            debug!(?phase, ?edit, "edit ignored");
            return false;
        }
        self.form.apply(edit, &*self.codec, self.zero_policy);
        true
    }

    pub async fn submit(&mut self) -> SubmitOutcome {
        {
            let mut st = lock(&self.status);
            if !st.phase.can_submit() {
                debug!(phase = ?st.phase, "submit ignored");
                return SubmitOutcome::Ignored;
            }
            st.success = None;
            st.error = None;
        }
        self.timers.cancel(TimerSlot::ClearError);
        self.errors.clear();
        self.form.trim_text();

        let draft = match validate(&self.form, self.zero_policy) {
            Ok(draft) => draft,
            Err(errors) => {
                debug!(fields = errors.iter().count(), "local validation failed");
                lock(&self.status).phase = Phase::Idle;
                self.errors = errors.clone();
                return SubmitOutcome::Invalid(errors);
            }
        };

        lock(&self.status).phase = Phase::Submitting;
        let _guard = SubmittingGuard {
            status: self.status.clone(),
        };

        let result = match self.mode {
            FormMode::Create => self.api.create_product(&draft).await,
            FormMode::Edit(Some(id)) => self.api.update_product(id, &draft).await,
            FormMode::Edit(None) => {
                return self.finish_failed(MISSING_PRODUCT_ID.to_string());
            }
        };

        match result {
            Ok(product) => self.finish_saved(product),
            Err(err) => self.finish_error(err),
        }
    }

    /// Leaves the screen right away. Ignored mid-submit.
    pub fn cancel(&mut self) -> bool {
        if self.phase() == Phase::Submitting {
            return false;
        }
        self.timers.cancel_all();
        self.navigator.go_to(Route::to(Screen::Products));
        true
    }

    fn finish_saved(&mut self, product: Product) -> SubmitOutcome {
        let message = match self.mode {
            FormMode::Create => {
                self.form = FormState::default();
                CREATED
            }
            FormMode::Edit(_) => UPDATED,
        };
        info!(id = product.id, mode = ?self.mode, "product saved");
        {
            let mut st = lock(&self.status);
            st.phase = Phase::Succeeded;
            st.success = Some(message.to_string());
        }
        self.schedule_redirect(Route::to(Screen::Products));
        SubmitOutcome::Saved(product)
    }

    fn finish_error(&mut self, err: ApiError) -> SubmitOutcome {
        if let ApiError::Validation { message, errors, .. } = &err {
            if !errors.is_empty() {
                let mut last = None;
                for violation in errors {
                    match Field::from_server_path(&violation.field) {
                        Some(field) => self.errors.set(field, violation.message.clone()),
                        None => warn!(field = %violation.field, "server rejected unknown field"),
                    }
                    last = Some(violation.message.as_str());
                }
                let banner = message
                    .as_deref()
                    .filter(|m| !m.trim().is_empty())
                    .or(last)
                    .unwrap_or(self.failure_fallback())
                    .to_string();

                warn!(fields = errors.len(), "server rejected product");
                {
                    let mut st = lock(&self.status);
                    st.phase = Phase::Rejected;
                    st.error = Some(banner);
                }
                self.schedule_error_clear();
                return SubmitOutcome::Rejected(self.errors.clone());
            }
        }

        warn!(error = %err, "product submit failed");
        let message = err.server_message().unwrap_or(self.failure_fallback()).to_string();
        self.finish_failed(message)
    }

    fn finish_failed(&mut self, message: String) -> SubmitOutcome {
        {
            let mut st = lock(&self.status);
            st.phase = Phase::Failed;
            st.error = Some(message.clone());
        }
        self.schedule_error_clear();
        SubmitOutcome::Failed(message)
    }

    fn failure_fallback(&self) -> &'static str {
        match self.mode {
            FormMode::Create => CREATE_FAILED,
            FormMode::Edit(_) => UPDATE_FAILED,
        }
    }

    fn schedule_error_clear(&mut self) {
        let status = self.status.clone();
        self.timers
            .schedule(TimerSlot::ClearError, self.timings.error_clear_delay, move || {
                let mut st = lock(&status);
                st.error = None;
                if matches!(st.phase, Phase::Rejected | Phase::Failed) {
                    st.phase = Phase::Idle;
                }
            });
    }

    fn schedule_redirect(&mut self, route: Route) {
        let navigator = self.navigator.clone();
        self.timers
            .schedule(TimerSlot::Navigate, self.timings.redirect_delay, move || {
                navigator.go_to(route);
            });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_phase_gates() {
        assert!(Phase::Idle.can_submit());
        assert!(Phase::Rejected.can_submit());
        assert!(Phase::Failed.can_submit());
        assert!(!Phase::Submitting.can_submit());
        assert!(!Phase::Succeeded.can_submit());
        assert!(!Phase::Loading.can_submit());
        assert!(!Phase::LoadFailed.can_submit());
        assert!(!Phase::LoadFailed.shows_form());
        assert!(Phase::Succeeded.shows_form());
    }

    #[test]
    fn test_guard_resets_unsettled_submit() {
        let status = Arc::new(Mutex::new(Status {
            phase: Phase::Submitting,
            ..Status::default()
        }));
        drop(SubmittingGuard {
            status: status.clone(),
        });
        assert_eq!(lock(&status).phase, Phase::Idle);

        lock(&status).phase = Phase::Succeeded;
        drop(SubmittingGuard {
            status: status.clone(),
        });
        assert_eq!(lock(&status).phase, Phase::Succeeded);
    }
}
