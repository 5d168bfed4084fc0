use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use thiserror::Error;
use tracing::{debug, instrument};

use crate::balance::reader::BalanceReader;
use crate::error::{AppError, AppResult};
use crate::executor::service::ActionExecutor;
use crate::ports::incoming::checkout::CheckoutUseCase;
use domain::action::GatedActionRequest;
use domain::auth::{Identity, IdentityState};
use domain::checkout::CheckoutSession;
use domain::credits::{CostSchedule, Credits, InsufficientCredits};
use domain::error::DomainError;
use domain::outcome::{Confirmation, GateError, GatedActionOutcome};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsufficientSource {
    /// Refused locally from the cached balance, no request was sent.
    Cached,
    Backend,
}

#[derive(Debug, Clone, PartialEq)]
pub enum GateState {
    Idle,
    Busy,
    Accepted(Confirmation),
    InsufficientCredits {
        needed: Credits,
        remaining: Credits,
        source: InsufficientSource,
    },
    Rejected(String),
    TransportError(String),
    IdentityAbsent,
}

impl GateState {
    pub fn is_busy(&self) -> bool {
        matches!(self, Self::Busy)
    }

    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::Idle | Self::Busy)
    }

    pub fn error(&self) -> Option<GateError> {
        match self {
            Self::Idle | Self::Busy | Self::Accepted(_) => None,
            Self::InsufficientCredits {
                needed, remaining, ..
            } => Some(GateError::InsufficientBalance(InsufficientCredits::new(
                *needed, *remaining,
            ))),
            Self::Rejected(message) => Some(GateError::BackendRejected(message.clone())),
            Self::TransportError(message) => Some(GateError::Transport(message.clone())),
            Self::IdentityAbsent => Some(GateError::IdentityAbsent),
        }
    }
}

impl From<GatedActionOutcome> for GateState {
    fn from(outcome: GatedActionOutcome) -> Self {
        match outcome {
            GatedActionOutcome::Accepted(confirmation) => Self::Accepted(confirmation),
            GatedActionOutcome::InsufficientCredits { needed, remaining } => {
                Self::InsufficientCredits {
                    needed,
                    remaining,
                    source: InsufficientSource::Backend,
                }
            }
            GatedActionOutcome::Rejected(message) => Self::Rejected(message),
            GatedActionOutcome::TransportError(message) => Self::TransportError(message),
        }
    }
}

/// Invocations refused at the interaction boundary; the state is left as it was.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum InvokeError {
    #[error("This action is already in progress")]
    Busy,

    #[error("Sign-in state is still loading")]
    IdentityPending,

    #[error(transparent)]
    InvalidRequest(#[from] DomainError),

    #[error("Result discarded: the signed-in user changed or the action was detached")]
    Superseded,

    #[error("Action has been detached")]
    Detached,
}

/// Collaborators shared by every gated action of one client.
pub struct GateContext {
    balance: Arc<BalanceReader>,
    executor: Arc<ActionExecutor>,
    checkout: Arc<dyn CheckoutUseCase>,
    costs: CostSchedule,
}

impl GateContext {
    pub fn new(
        balance: Arc<BalanceReader>,
        executor: Arc<ActionExecutor>,
        checkout: Arc<dyn CheckoutUseCase>,
        costs: CostSchedule,
    ) -> Arc<Self> {
        Arc::new(Self {
            balance,
            executor,
            checkout,
            costs,
        })
    }

    pub fn balance(&self) -> &Arc<BalanceReader> {
        &self.balance
    }

    pub fn costs(&self) -> &CostSchedule {
        &self.costs
    }

    /// Each independently gated button or modal gets its own controller.
    pub fn controller(self: &Arc<Self>) -> GateController {
        GateController {
            context: Arc::clone(self),
            inner: Mutex::new(ControllerState {
                state: GateState::Idle,
                detached: false,
            }),
        }
    }
}

struct ControllerState {
    state: GateState,
    detached: bool,
}

enum Begin {
    Settled(GateState),
    Proceed(Identity),
}

/// Puts a controller back to `Idle` when an invocation is dropped while Busy.
struct BusyPeriod<'a> {
    controller: &'a GateController,
    armed: bool,
}

impl<'a> BusyPeriod<'a> {
    fn new(controller: &'a GateController) -> Self {
        Self {
            controller,
            armed: true,
        }
    }

    fn answered(mut self) {
        self.armed = false;
    }
}

impl Drop for BusyPeriod<'_> {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }
        let mut inner = self.controller.lock();
        if inner.state.is_busy() {
            debug!("Gated action dropped before the backend answered");
            inner.state = GateState::Idle;
        }
    }
}

/// State machine for one gated action: `Idle -> Busy -> terminal`, back to
/// `Idle` on reset. At most one executor call is outstanding per controller.
pub struct GateController {
    context: Arc<GateContext>,
    inner: Mutex<ControllerState>,
}

impl GateController {
    fn lock(&self) -> MutexGuard<'_, ControllerState> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn state(&self) -> GateState {
        self.lock().state.clone()
    }

    pub fn is_busy(&self) -> bool {
        self.lock().state.is_busy()
    }

    /// Needed/remaining pair to drive a top-up offer.
    pub fn insufficient_credits(&self) -> Option<InsufficientCredits> {
        match self.lock().state {
            GateState::InsufficientCredits {
                needed, remaining, ..
            } => Some(InsufficientCredits::new(needed, remaining)),
            _ => None,
        }
    }

    #[instrument(skip(self, request), fields(kind = %request.kind()))]
    pub async fn invoke(&self, request: GatedActionRequest) -> Result<GateState, InvokeError> {
        request.validate()?;

        let identity = match self.begin(&request)? {
            Begin::Settled(state) => return Ok(state),
            Begin::Proceed(identity) => identity,
        };

        let busy = BusyPeriod::new(self);
        let outcome = self.context.executor.execute(&identity, &request).await;
        busy.answered();
        let state = self.settle(&identity, outcome)?;

        self.context.balance.revalidate().await;
        Ok(state)
    }

    fn begin(&self, request: &GatedActionRequest) -> Result<Begin, InvokeError> {
        let mut inner = self.lock();
        if inner.detached {
            return Err(InvokeError::Detached);
        }
        if inner.state.is_busy() {
            return Err(InvokeError::Busy);
        }

        let identity = match self.context.balance.identity_state() {
            IdentityState::Loading => return Err(InvokeError::IdentityPending),
            IdentityState::Anonymous => {
                inner.state = GateState::IdentityAbsent;
                return Ok(Begin::Settled(GateState::IdentityAbsent));
            }
            IdentityState::SignedIn(identity) => identity,
        };

        let cost = request.declared_cost(&self.context.costs);
        let cached = self.context.balance.cached_credits();
        if let Some(cached) = cached.filter(|cached| cost > *cached) {
            debug!(cost, cached, "Refusing gated action from cached balance");
            inner.state = GateState::InsufficientCredits {
                needed: cost,
                remaining: cached,
                source: InsufficientSource::Cached,
            };
            return Ok(Begin::Settled(inner.state.clone()));
        }

        inner.state = GateState::Busy;
        Ok(Begin::Proceed(identity))
    }

    fn settle(
        &self,
        identity: &Identity,
        outcome: GatedActionOutcome,
    ) -> Result<GateState, InvokeError> {
        let mut inner = self.lock();
        if inner.detached || !self.context.balance.is_current(identity) {
            debug!(outcome = outcome.label(), "Discarding stale gated action result");
            inner.state = GateState::Idle;
            return Err(InvokeError::Superseded);
        }

        inner.state = GateState::from(outcome);
        Ok(inner.state.clone())
    }

    /// Re-enters `Idle` from any settled state, e.g. after the user edits inputs.
    pub fn reset(&self) -> Result<(), InvokeError> {
        let mut inner = self.lock();
        if inner.state.is_busy() {
            return Err(InvokeError::Busy);
        }
        inner.state = GateState::Idle;
        Ok(())
    }

    /// Marks the owning view as gone; an in-flight result will be dropped.
    pub fn detach(&self) {
        self.lock().detached = true;
    }

    pub async fn start_top_up(&self, price_id: &str) -> AppResult<CheckoutSession> {
        if self.insufficient_credits().is_none() {
            return Err(AppError::ValidationError {
                message: "Top-up is only offered after an insufficient credits response"
                    .to_string(),
            });
        }

        let identity = self.context.balance.current_identity();
        self.context
            .checkout
            .start_checkout(identity.as_ref(), price_id)
            .await
    }
}
