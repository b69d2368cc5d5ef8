// self
use crate::{_prelude::*, error::SessionError, obs::CallKind, store::StoreError};

/// Type alias that resolves to an instrumented future when tracing is enabled.
#[cfg(feature = "tracing")]
pub type InstrumentedCall<F> = tracing::instrument::Instrumented<F>;
/// Passthrough future type when tracing is disabled.
#[cfg(not(feature = "tracing"))]
pub type InstrumentedCall<F> = F;

/// A span builder used by gateway operations.
#[derive(Clone, Debug)]
pub struct CallSpan {
	#[cfg(feature = "tracing")]
	span: tracing::Span,
}
impl CallSpan {
	/// Creates a new span tagged with the provided call kind + stage.
	pub fn new(kind: CallKind, stage: &'static str) -> Self {
		#[cfg(feature = "tracing")]
		{
			let span = tracing::info_span!("erp_gateway.call", call = kind.as_str(), stage);

			Self { span }
		}
		#[cfg(not(feature = "tracing"))]
		{
			let _ = (kind, stage);

			Self {}
		}
	}

	/// Instruments an async block without holding a guard across `.await` points.
	pub fn instrument<Fut>(&self, fut: Fut) -> InstrumentedCall<Fut>
	where
		Fut: Future,
	{
		#[cfg(feature = "tracing")]
		{
			use tracing::Instrument;

			fut.instrument(self.span.clone())
		}
		#[cfg(not(feature = "tracing"))]
		{
			fut
		}
	}
}

/// Emits a debug event when a request is parked behind an in-flight refresh.
pub fn record_queued(position: usize) {
	#[cfg(feature = "tracing")]
	{
		tracing::debug!(position, "request queued behind in-flight refresh");
	}
	#[cfg(not(feature = "tracing"))]
	{
		let _ = position;
	}
}

/// Emits a warning when the session is torn down.
pub fn record_session_end(reason: &SessionError) {
	#[cfg(feature = "tracing")]
	{
		tracing::warn!(%reason, "session ended; credentials cleared");
	}
	#[cfg(not(feature = "tracing"))]
	{
		let _ = reason;
	}
}

/// Emits a warning when the store could not persist a cleared session.
pub fn record_clear_failure(error: &StoreError) {
	#[cfg(feature = "tracing")]
	{
		tracing::warn!(%error, "credential store failed to persist cleared session");
	}
	#[cfg(not(feature = "tracing"))]
	{
		let _ = error;
	}
}
