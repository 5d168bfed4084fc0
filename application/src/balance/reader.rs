use std::mem;
use std::sync::{Mutex, MutexGuard, PoisonError};

use tracing::{debug, instrument, warn};

use crate::error::AppResult;
use crate::ports::outgoing::{
    balance_endpoint::DynBalancePort, balance_events::DynBalanceEventsPort,
};
use domain::auth::{Identity, IdentityState};
use domain::credits::{BalanceSnapshot, Credits};

struct ReaderState {
    identity: IdentityState,
    snapshot: BalanceSnapshot,
    next_token: u64,
    in_flight: Option<u64>,
    rerun_requested: bool,
}

enum ReadStart {
    Skip(BalanceSnapshot),
    Go(Identity, u64),
}

enum ReadFinish {
    Done(BalanceSnapshot),
    Rerun,
}

/// Releases the single-flight slot when a read future is dropped mid-fetch.
struct InFlightRead<'a> {
    reader: &'a BalanceReader,
    token: u64,
    armed: bool,
}

impl<'a> InFlightRead<'a> {
    fn new(reader: &'a BalanceReader, token: u64) -> Self {
        Self {
            reader,
            token,
            armed: true,
        }
    }

    fn landed(mut self) {
        self.armed = false;
    }
}

impl Drop for InFlightRead<'_> {
    fn drop(&mut self) {
        if self.armed {
            self.reader.abandon_read(self.token);
        }
    }
}

/// Process-wide cache of the signed-in user's credit balance.
///
/// This is the only writer of the cached balance. Reads are single-flight per
/// identity: a revalidation requested while a read is outstanding is folded
/// into one follow-up read, and results that arrive after the identity
/// changed are dropped.
pub struct BalanceReader {
    port: DynBalancePort,
    events: DynBalanceEventsPort,
    state: Mutex<ReaderState>,
}

impl BalanceReader {
    pub fn new(port: DynBalancePort, events: DynBalanceEventsPort) -> Self {
        Self {
            port,
            events,
            state: Mutex::new(ReaderState {
                identity: IdentityState::Loading,
                snapshot: BalanceSnapshot::empty(),
                next_token: 0,
                in_flight: None,
                rerun_requested: false,
            }),
        }
    }

    fn lock(&self) -> MutexGuard<'_, ReaderState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn publish(&self, snapshot: &BalanceSnapshot) {
        if let Err(e) = self.events.publish_balance(snapshot) {
            warn!("Failed to publish balance snapshot: {}", e);
        }
    }

    pub fn snapshot(&self) -> BalanceSnapshot {
        self.lock().snapshot.clone()
    }

    pub fn cached_credits(&self) -> Option<Credits> {
        self.lock().snapshot.credits
    }

    pub fn identity_state(&self) -> IdentityState {
        self.lock().identity.clone()
    }

    pub fn current_identity(&self) -> Option<Identity> {
        self.lock().identity.identity().cloned()
    }

    pub fn is_current(&self, identity: &Identity) -> bool {
        self.lock().identity.identity() == Some(identity)
    }

    /// Switches the identity the cache belongs to and re-reads when signed in.
    ///
    /// Any change drops the previous user's balance before the new read lands.
    pub async fn set_identity(&self, identity: IdentityState) -> BalanceSnapshot {
        let changed = {
            let mut state = self.lock();
            if state.identity == identity {
                false
            } else {
                state.identity = identity;
                state.in_flight = None;
                state.rerun_requested = false;
                state.snapshot = BalanceSnapshot::empty();
                let snapshot = state.snapshot.clone();
                drop(state);
                self.publish(&snapshot);
                true
            }
        };

        if changed {
            self.revalidate().await
        } else {
            self.snapshot()
        }
    }

    #[instrument(skip(self))]
    pub async fn revalidate(&self) -> BalanceSnapshot {
        loop {
            let (identity, token) = match self.begin_read() {
                ReadStart::Skip(snapshot) => return snapshot,
                ReadStart::Go(identity, token) => (identity, token),
            };

            debug!(user_id = %identity.user_id, token, "Reading credit balance");
            let read = InFlightRead::new(self, token);
            let result = self.port.fetch_credits(&identity).await;
            read.landed();

            match self.finish_read(token, result) {
                ReadFinish::Done(snapshot) => return snapshot,
                ReadFinish::Rerun => {}
            }
        }
    }

    fn begin_read(&self) -> ReadStart {
        let mut state = self.lock();
        let Some(identity) = state.identity.identity().cloned() else {
            return ReadStart::Skip(state.snapshot.clone());
        };

        if state.in_flight.is_some() {
            state.rerun_requested = true;
            return ReadStart::Skip(state.snapshot.clone());
        }

        state.next_token += 1;
        let token = state.next_token;
        state.in_flight = Some(token);
        state.snapshot.loading = true;
        state.snapshot.error = None;
        let snapshot = state.snapshot.clone();
        drop(state);

        self.publish(&snapshot);
        ReadStart::Go(identity, token)
    }

    // The caller gave up on the read. A coalesced follow-up cannot run from
    // here, so the next `revalidate` starts a fresh read instead.
    fn abandon_read(&self, token: u64) {
        let mut state = self.lock();
        if state.in_flight != Some(token) {
            return;
        }

        state.in_flight = None;
        state.rerun_requested = false;
        state.snapshot.loading = false;
        let snapshot = state.snapshot.clone();
        drop(state);

        debug!(token, "Balance read abandoned before it landed");
        self.publish(&snapshot);
    }

    fn finish_read(&self, token: u64, result: AppResult<Credits>) -> ReadFinish {
        let mut state = self.lock();
        if state.in_flight != Some(token) {
            debug!(token, "Discarding balance read for a previous identity");
            return ReadFinish::Done(state.snapshot.clone());
        }

        state.in_flight = None;
        state.snapshot.loading = false;
        match result {
            Ok(credits) => {
                state.snapshot.credits = Some(credits);
                state.snapshot.error = None;
            }
            Err(e) => {
                warn!("Balance read failed: {}", e);
                state.snapshot.error = Some(e.to_string());
            }
        }

        let rerun = mem::take(&mut state.rerun_requested);
        let snapshot = state.snapshot.clone();
        drop(state);

        self.publish(&snapshot);
        if rerun {
            ReadFinish::Rerun
        } else {
            ReadFinish::Done(snapshot)
        }
    }
}
