//! Single-flight credential refresh.
//!
//! The coordinator is a two-state machine (`Idle`, `Refreshing`) guarded by a synchronous
//! lock that is never held across an `.await`. The first request to see a 401 while `Idle`
//! becomes the leader and performs the refresh; requests that see a 401 while `Refreshing`
//! park a oneshot sender in the queue and wait. When the leader settles, the queue is drained
//! in arrival order with the same outcome. A generation counter bumped on every successful
//! refresh lets a request that was sent before a refresh completed skip straight to replay,
//! and keys session teardown so it runs once per generation.

// crates.io
use futures::channel::oneshot;
// self
use crate::{
	_prelude::*,
	auth::{REFRESH_PATH, Secret},
	error::SessionError,
	gateway::SessionGateway,
	http::{ApiRequest, ApiTransport},
	obs::{self, CallKind, CallOutcome, CallSpan, Endpoint},
};

type RefreshOutcome = Result<Secret, SessionError>;
type Waiter = oneshot::Sender<RefreshOutcome>;

#[derive(Debug, Default)]
pub(crate) struct RefreshState {
	phase: Phase,
	generation: u64,
	torn_down: Option<u64>,
}
impl RefreshState {
	pub(crate) fn generation(&self) -> u64 {
		self.generation
	}

	pub(crate) fn is_refreshing(&self) -> bool {
		matches!(self.phase, Phase::Refreshing(_))
	}

	fn enter(&mut self, seen_generation: u64) -> Role {
		if self.generation != seen_generation {
			return Role::Superseded;
		}

		match &mut self.phase {
			Phase::Refreshing(waiters) => {
				let (tx, rx) = oneshot::channel();

				waiters.push(tx);

				Role::Follower { rx, position: waiters.len() }
			},
			Phase::Idle => {
				self.phase = Phase::Refreshing(Vec::new());

				Role::Leader
			},
		}
	}

	fn settle(&mut self, refreshed: bool) -> Vec<Waiter> {
		if refreshed {
			self.generation = self.generation.wrapping_add(1);
		}

		match std::mem::take(&mut self.phase) {
			Phase::Refreshing(waiters) => waiters,
			Phase::Idle => Vec::new(),
		}
	}

	/// Returns `true` for the first teardown of `generation`, `false` for every repeat.
	pub(crate) fn claim_teardown(&mut self, generation: u64) -> bool {
		if self.torn_down == Some(generation) {
			return false;
		}

		self.torn_down = Some(generation);

		true
	}

	pub(crate) fn reopen(&mut self) {
		self.torn_down = None;
	}
}

#[derive(Debug, Default)]
enum Phase {
	#[default]
	Idle,
	Refreshing(Vec<Waiter>),
}

enum Role {
	Leader,
	Follower { rx: oneshot::Receiver<RefreshOutcome>, position: usize },
	Superseded,
}

/// Returns the coordinator to `Idle` exactly once; dropping it unsettled fails the queue.
struct SettleGuard<'a> {
	state: &'a Mutex<RefreshState>,
	armed: bool,
}
impl<'a> SettleGuard<'a> {
	fn new(state: &'a Mutex<RefreshState>) -> Self {
		Self { state, armed: true }
	}

	fn settle(mut self, outcome: &RefreshOutcome) {
		self.armed = false;

		Self::wake(self.state, outcome);
	}

	fn wake(state: &Mutex<RefreshState>, outcome: &RefreshOutcome) {
		let waiters = state.lock().settle(outcome.is_ok());

		for waiter in waiters {
			// A dropped receiver means that caller gave up; nothing to deliver.
			let _ = waiter.send(outcome.clone());
		}
	}
}
impl Drop for SettleGuard<'_> {
	fn drop(&mut self) {
		if self.armed {
			Self::wake(self.state, &Err(SessionError::Abandoned));
		}
	}
}

#[derive(Serialize)]
struct RefreshRequest<'a> {
	refresh: &'a Secret,
}

#[derive(Deserialize)]
struct RefreshResponse {
	access: Secret,
	#[serde(default)]
	refresh: Option<Secret>,
}

impl<T> SessionGateway<T>
where
	T: ?Sized + ApiTransport,
{
	/// Produces an access token usable for replaying a request that just saw a 401.
	///
	/// `seen_generation` is the refresh generation observed before the failing request read
	/// its bearer token.
	pub(crate) async fn refreshed_access_token(&self, seen_generation: u64) -> Result<Secret> {
		let role = self.refresh.lock().enter(seen_generation);

		match role {
			Role::Leader => self.lead_refresh().await,
			Role::Follower { rx, position } => {
				self.refresh_metrics.record_queued();
				obs::record_queued(position);

				Ok(rx.await.unwrap_or(Err(SessionError::Abandoned))?)
			},
			Role::Superseded => self
				.store
				.load()
				.await?
				.access_token
				.ok_or_else(|| SessionError::SignedOut.into()),
		}
	}

	async fn lead_refresh(&self) -> Result<Secret> {
		const KIND: CallKind = CallKind::Refresh;

		let span = CallSpan::new(KIND, "lead_refresh");
		// Only `settle` moves the generation, and it runs after this.
		let generation = self.refresh.lock().generation();
		let guard = SettleGuard::new(&self.refresh);

		obs::record_call_outcome(KIND, Endpoint::Users, CallOutcome::Attempt);
		self.refresh_metrics.record_attempt();

		let outcome = span.instrument(self.exchange_refresh_token()).await;

		obs::record_call_outcome(KIND, Endpoint::Users, CallOutcome::of(&outcome));

		match outcome {
			Ok(token) => {
				self.refresh_metrics.record_success();
				guard.settle(&Ok(token.clone()));

				Ok(token)
			},
			Err(reason) => {
				self.refresh_metrics.record_failure();

				let first_teardown = self.refresh.lock().claim_teardown(generation);

				// Clear before waking the queue so no caller can replay with the dead pair.
				if first_teardown {
					self.clear_credentials().await;
				}

				guard.settle(&Err(reason.clone()));

				if first_teardown {
					self.notify_session_end(&reason, Endpoint::Users);
				}

				Err(reason.into())
			},
		}
	}

	async fn exchange_refresh_token(&self) -> RefreshOutcome {
		let credentials = self.store.load().await.map_err(SessionError::refresh_failed)?;
		let refresh = credentials
			.refresh_token
			.filter(|secret| !secret.is_blank())
			.ok_or(SessionError::MissingRefreshToken)?;
		let request = ApiRequest::post_json(REFRESH_PATH, &RefreshRequest { refresh: &refresh })
			.map_err(SessionError::refresh_failed)?
			.anonymous();
		let response =
			self.dispatch(&request, None).await.map_err(SessionError::refresh_failed)?;

		if !response.is_success() {
			return Err(SessionError::RefreshRejected { status: response.status });
		}

		let body = response.decode::<RefreshResponse>().map_err(SessionError::refresh_failed)?;

		if body.access.is_blank() {
			return Err(SessionError::refresh_failed("empty access token in refresh response"));
		}

		self.store
			.replace_access(body.access.clone(), body.refresh)
			.await
			.map_err(SessionError::refresh_failed)?;

		Ok(body.access)
	}
}
