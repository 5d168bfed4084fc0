use std::sync::Arc;
use tokio::sync::watch;
use tracing::info;

use domain::auth::IdentityState;
use domain::credits::{BalanceSnapshot, CostSchedule};
use poolify_adapters::outgoing::{
    events_watch::tokio_watch::TokioWatchBalanceAdapter,
    http_reqwest::{
        BackendHttpClient, balance_http::HttpBalanceAdapter, checkout_http::HttpCheckoutAdapter,
        coupon_http::HttpCouponAdapter, jobs_http::HttpJobsAdapter,
        paid_action_http::HttpPaidActionAdapter, profile_http::HttpProfileAdapter,
    },
};
use poolify_application::error::AppError;
use poolify_application::infrastructure_config::Config;
use poolify_application::ports::incoming::{
    checkout::CheckoutUseCase, coupon::CouponUseCase, jobs::JobsQueryUseCase,
    profile::ProfileQueryUseCase,
};
use poolify_application::ports::outgoing::balance_events::BalanceEventsPort;
use poolify_application::{
    balance::reader::BalanceReader,
    checkout::service::CheckoutService,
    coupon::service::CouponService,
    executor::service::ActionExecutor,
    gate::controller::{GateContext, GateController},
    jobs::service::JobsService,
    profile::service::ProfileService,
};

/// Everything a front end needs to drive gated actions against one backend.
#[derive(Clone)]
pub struct ClientState {
    pub config: Arc<Config>,
    balance: Arc<BalanceReader>,
    balance_events: Arc<TokioWatchBalanceAdapter>,
    gate_context: Arc<GateContext>,
    pub checkout_service: Arc<dyn CheckoutUseCase>,
    pub jobs_service: Arc<dyn JobsQueryUseCase>,
    pub coupon_service: Arc<dyn CouponUseCase>,
    pub profile_service: Arc<dyn ProfileQueryUseCase>,
}

impl ClientState {
    pub fn new(config: Config) -> Result<Self, AppError> {
        config.validate()?;
        let config = Arc::new(config);

        let http = BackendHttpClient::new(&config.backend)?;
        let balance_events = Arc::new(TokioWatchBalanceAdapter::new(
            config.balance_events.log_snapshots,
        ));
        let events_port: Arc<dyn BalanceEventsPort> =
            Arc::<TokioWatchBalanceAdapter>::clone(&balance_events);
        let balance = Arc::new(BalanceReader::new(
            Arc::new(HttpBalanceAdapter::new(http.clone())),
            events_port,
        ));

        let checkout_service: Arc<dyn CheckoutUseCase> = Arc::new(CheckoutService::new(
            Arc::new(HttpCheckoutAdapter::new(http.clone())),
            config.checkout.packs.clone(),
        ));
        let jobs_service: Arc<dyn JobsQueryUseCase> =
            Arc::new(JobsService::new(Arc::new(HttpJobsAdapter::new(http.clone()))));
        let coupon_service: Arc<dyn CouponUseCase> = Arc::new(CouponService::new(
            Arc::new(HttpCouponAdapter::new(http.clone())),
            Arc::clone(&balance),
        ));
        let profile_service: Arc<dyn ProfileQueryUseCase> = Arc::new(ProfileService::new(
            Arc::new(HttpProfileAdapter::new(http.clone())),
            Arc::clone(&balance),
        ));

        let executor = Arc::new(ActionExecutor::new(Arc::new(HttpPaidActionAdapter::new(
            http,
        ))));
        let gate_context = GateContext::new(
            Arc::clone(&balance),
            executor,
            Arc::clone(&checkout_service),
            config.pricing.clone(),
        );

        info!(
            backend = %config.backend.base_url,
            env = %config.environment.env,
            "Client state initialised"
        );

        Ok(Self {
            config,
            balance,
            balance_events,
            gate_context,
            checkout_service,
            jobs_service,
            coupon_service,
            profile_service,
        })
    }

    pub fn balance(&self) -> &Arc<BalanceReader> {
        &self.balance
    }

    /// Latest snapshot first, then every change published by the balance reader.
    pub fn balance_updates(&self) -> watch::Receiver<BalanceSnapshot> {
        self.balance_events.subscribe()
    }

    /// Forward sign-in changes here; an identity switch drops the old balance.
    pub async fn set_identity(&self, identity: IdentityState) -> BalanceSnapshot {
        self.balance.set_identity(identity).await
    }

    pub fn costs(&self) -> &CostSchedule {
        self.gate_context.costs()
    }

    /// A fresh controller per gated button or modal.
    pub fn gate(&self) -> GateController {
        self.gate_context.controller()
    }
}
