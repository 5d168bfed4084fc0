use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use secrecy::{ExposeSecret, SecretString};
use tokio::sync::watch;
use tokio::time::sleep;
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::ports::outgoing::{
    balance_endpoint::BalancePort,
    balance_events::BalanceEventsPort,
    checkout::{CheckoutPort, CheckoutSessionResponse},
    coupon::{CouponPort, RedeemResponse},
    jobs::JobsPort,
    paid_action::{PaidActionPort, RawResponse, TransportFailure},
    profile::ProfilePort,
};
use domain::action::GatedActionRequest;
use domain::auth::{Identity, UserId};
use domain::checkout::CreditPack;
use domain::credits::{BalanceSnapshot, Credits};
use domain::gallery::{Gallery, JobSummary};
use domain::profile::AccountOverview;

pub fn identity(email: &str) -> Identity {
    let seed = email
        .bytes()
        .fold(0u128, |acc, b| acc.wrapping_mul(31).wrapping_add(u128::from(b)));
    let id = Uuid::from_u128(seed);
    Identity::new(UserId::from_uuid(id), email)
}

/// Blocks port calls while held, so tests can observe in-flight state.
pub struct Latch {
    open: watch::Sender<bool>,
}

impl Latch {
    fn new() -> Self {
        let (open, _) = watch::channel(true);
        Self { open }
    }

    fn hold(&self) {
        self.open.send_replace(false);
    }

    fn release(&self) {
        self.open.send_replace(true);
    }

    async fn pass(&self) {
        let mut rx = self.open.subscribe();
        rx.wait_for(|open| *open).await.ok();
    }
}

async fn wait_until(counter: &AtomicUsize, expected: usize) {
    for _ in 0..200 {
        if counter.load(Ordering::SeqCst) >= expected {
            return;
        }
        sleep(Duration::from_millis(5)).await;
    }
}

pub struct FakeBalancePort {
    pub calls: AtomicUsize,
    pub in_flight: AtomicUsize,
    credits: Mutex<Credits>,
    failures: Mutex<VecDeque<String>>,
    latch: Latch,
}

impl FakeBalancePort {
    pub fn with_credits(credits: Credits) -> Self {
        Self {
            calls: AtomicUsize::new(0),
            in_flight: AtomicUsize::new(0),
            credits: Mutex::new(credits),
            failures: Mutex::new(VecDeque::new()),
            latch: Latch::new(),
        }
    }

    pub fn set_credits(&self, credits: Credits) {
        *self.credits.lock().unwrap() = credits;
    }

    pub fn fail_next(&self, message: &str) {
        self.failures.lock().unwrap().push_back(message.to_string());
    }

    pub fn hold(&self) {
        self.latch.hold();
    }

    pub fn release(&self) {
        self.latch.release();
    }

    pub async fn wait_for_calls(&self, expected: usize) {
        wait_until(&self.calls, expected).await;
    }
}

#[async_trait::async_trait]
impl BalancePort for FakeBalancePort {
    async fn fetch_credits(&self, _identity: &Identity) -> AppResult<Credits> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.in_flight.fetch_add(1, Ordering::SeqCst);
        self.latch.pass().await;
        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        let failure = self.failures.lock().unwrap().pop_front();
        match failure {
            Some(message) => Err(AppError::ExternalServiceError { message }),
            None => Ok(*self.credits.lock().unwrap()),
        }
    }
}

#[derive(Default)]
pub struct RecordingEvents {
    snapshots: Mutex<Vec<BalanceSnapshot>>,
}

impl RecordingEvents {
    pub fn last(&self) -> Option<BalanceSnapshot> {
        self.snapshots.lock().unwrap().last().cloned()
    }
}

impl BalanceEventsPort for RecordingEvents {
    fn publish_balance(&self, snapshot: &BalanceSnapshot) -> AppResult<()> {
        self.snapshots.lock().unwrap().push(snapshot.clone());
        Ok(())
    }
}

pub struct FakePaidActionPort {
    pub calls: AtomicUsize,
    pub in_flight: AtomicUsize,
    pub max_in_flight: AtomicUsize,
    responses: Mutex<VecDeque<Result<RawResponse, TransportFailure>>>,
    latch: Latch,
}

impl FakePaidActionPort {
    pub fn new() -> Self {
        Self {
            calls: AtomicUsize::new(0),
            in_flight: AtomicUsize::new(0),
            max_in_flight: AtomicUsize::new(0),
            responses: Mutex::new(VecDeque::new()),
            latch: Latch::new(),
        }
    }

    pub fn respond(&self, status: u16, body: &str) {
        self.responses
            .lock()
            .unwrap()
            .push_back(Ok(RawResponse::new(status, "", body)));
    }

    pub fn fail(&self, message: &str) {
        self.responses
            .lock()
            .unwrap()
            .push_back(Err(TransportFailure::new(message)));
    }

    pub fn hold(&self) {
        self.latch.hold();
    }

    pub fn release(&self) {
        self.latch.release();
    }

    pub async fn wait_for_calls(&self, expected: usize) {
        wait_until(&self.calls, expected).await;
    }
}

#[async_trait::async_trait]
impl PaidActionPort for FakePaidActionPort {
    async fn send(
        &self,
        _identity: &Identity,
        _request: &GatedActionRequest,
    ) -> Result<RawResponse, TransportFailure> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);
        self.latch.pass().await;
        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok(RawResponse::new(200, "OK", "{}")))
    }
}

pub struct FakeCheckoutPort {
    pub calls: AtomicUsize,
    pub url: Option<String>,
}

#[async_trait::async_trait]
impl CheckoutPort for FakeCheckoutPort {
    async fn create_checkout_session(
        &self,
        _identity: &Identity,
        _pack: &CreditPack,
    ) -> AppResult<CheckoutSessionResponse> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(CheckoutSessionResponse {
            url: self.url.clone(),
        })
    }
}

pub struct FakeCouponPort {
    pub response: RedeemResponse,
    pub seen: Mutex<Vec<(String, String)>>,
}

#[async_trait::async_trait]
impl CouponPort for FakeCouponPort {
    async fn redeem_coupon(
        &self,
        access_token: &SecretString,
        coupon: &str,
    ) -> AppResult<RedeemResponse> {
        self.seen.lock().unwrap().push((
            access_token.expose_secret().to_string(),
            coupon.to_string(),
        ));
        Ok(self.response.clone())
    }
}

#[derive(Default)]
pub struct FakeJobsPort {
    pub jobs: Vec<JobSummary>,
    pub gallery: Option<Gallery>,
}

#[async_trait::async_trait]
impl JobsPort for FakeJobsPort {
    async fn list_jobs(&self, _identity: &Identity) -> AppResult<Vec<JobSummary>> {
        Ok(self.jobs.clone())
    }

    async fn fetch_gallery(&self, token: &str) -> AppResult<Gallery> {
        self.gallery
            .clone()
            .ok_or_else(|| AppError::ExternalServiceError {
                message: format!("Gallery {token} not found"),
            })
    }
}

#[derive(Default)]
pub struct FakeProfilePort {
    pub calls: AtomicUsize,
    pub overview: Mutex<Option<AccountOverview>>,
}

impl FakeProfilePort {
    pub fn with_overview(overview: AccountOverview) -> Self {
        Self {
            calls: AtomicUsize::new(0),
            overview: Mutex::new(Some(overview)),
        }
    }
}

#[async_trait::async_trait]
impl ProfilePort for FakeProfilePort {
    async fn fetch_overview(&self, identity: &Identity) -> AppResult<AccountOverview> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.overview
            .lock()
            .unwrap()
            .clone()
            .ok_or_else(|| AppError::ExternalServiceError {
                message: format!("Profile for {} not found", identity.user_id),
            })
    }
}
