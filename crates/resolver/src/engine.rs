use crate::config::ResolverConfig;
use crate::context::ResolutionContext;
use crate::error::{ResolveFailure, Result};
use crate::handlers::{self, Collaborators, Halt};
use crate::provider::RepositoryProvider;
use crate::sink::ActionSink;
use crate::state::{transition, Action, State};
use log::{debug, info, warn};
use repolink_protocol::{redact_query, InvalidLinkEvent, LinkEvent};
use std::sync::{Arc, Mutex};
use tokio::sync::{watch, Mutex as TokioMutex, MutexGuard};
use tokio_util::sync::CancellationToken;

const UNKNOWN_ERROR: &str = "unknown error";

/// How a resolution ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Resolved,
    Errored(String),
    Cancelled,
}

/// Result of handing an event to [`Engine::submit`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Submission {
    /// The event was accepted and resolved to completion.
    Completed(Outcome),
    /// Another resolution is in flight; the event was dropped.
    Busy,
    /// The event failed validation and never entered the state machine.
    Rejected(InvalidLinkEvent),
}

/// Drives one deep link at a time through the resolution state machine.
pub struct Engine {
    provider: Arc<dyn RepositoryProvider>,
    sink: Arc<dyn ActionSink>,
    config: ResolverConfig,
    context: TokioMutex<ResolutionContext>,
    snapshot_tx: watch::Sender<ResolutionContext>,
    in_flight: Mutex<Option<CancellationToken>>,
}

impl Engine {
    #[must_use]
    pub fn new(provider: Arc<dyn RepositoryProvider>, sink: Arc<dyn ActionSink>) -> Self {
        let (snapshot_tx, _) = watch::channel(ResolutionContext::new());
        Self {
            provider,
            sink,
            config: ResolverConfig::default(),
            context: TokioMutex::new(ResolutionContext::new()),
            snapshot_tx,
            in_flight: Mutex::new(None),
        }
    }

    pub fn with_config(
        provider: Arc<dyn RepositoryProvider>,
        sink: Arc<dyn ActionSink>,
        config: ResolverConfig,
    ) -> Result<Self> {
        config.validate()?;
        let mut engine = Self::new(provider, sink);
        engine.config = config;
        Ok(engine)
    }

    /// Copy of the context as of the last transition.
    #[must_use]
    pub fn snapshot(&self) -> ResolutionContext {
        self.snapshot_tx.borrow().clone()
    }

    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<ResolutionContext> {
        self.snapshot_tx.subscribe()
    }

    /// Cancels the resolution in flight, if any. It stops at its next provider
    /// call and returns to idle without a message.
    pub fn cancel_current(&self) -> bool {
        match self.in_flight.lock() {
            Ok(guard) => match guard.as_ref() {
                Some(token) => {
                    token.cancel();
                    true
                }
                None => false,
            },
            Err(_) => {
                warn!("in-flight token lock poisoned");
                false
            }
        }
    }

    /// Resolves `event` to completion. Events arriving while another
    /// resolution is running are ignored.
    ///
    /// Dropping the returned future part-way abandons the resolution; the
    /// context is reset and the engine accepts the next event.
    pub async fn submit(&self, event: LinkEvent) -> Submission {
        let Ok(ctx) = self.context.try_lock() else {
            debug!(
                "ignoring deep link {} while another is resolving",
                redact_query(&event.raw_uri)
            );
            return Submission::Busy;
        };
        let mut active = ActiveResolution { engine: self, ctx };

        if let Err(reason) = event.validate() {
            warn!(
                "rejecting deep link {}: {reason}",
                redact_query(&event.raw_uri)
            );
            self.sink
                .show_error(&format!("Error resolving deep link: {reason}"))
                .await;
            return Submission::Rejected(reason);
        }

        info!(
            "resolving deep link {} ({})",
            redact_query(&event.raw_uri),
            event.link_type
        );
        let token = CancellationToken::new();
        self.set_in_flight(Some(token.clone()));
        active.ctx.accept(&event);

        let outcome = self.drive(&mut *active.ctx, &token).await;
        Submission::Completed(outcome)
    }

    async fn drive(&self, ctx: &mut ResolutionContext, cancel: &CancellationToken) -> Outcome {
        let deps = Collaborators {
            provider: self.provider.as_ref(),
            sink: self.sink.as_ref(),
            cancel,
        };

        let mut action = Action::EventFired;
        loop {
            let (next, taken) = advance(ctx.state, action);
            action = taken;
            debug!("{} --{}--> {}", ctx.state, action.label(), next);
            ctx.state = next;
            self.publish(ctx);

            if next == State::Idle {
                return self.finish(ctx, action).await;
            }

            action = if cancel.is_cancelled() {
                Action::Cancelled
            } else {
                self.step(next, ctx, &deps).await
            };
        }
    }

    async fn step(
        &self,
        state: State,
        ctx: &mut ResolutionContext,
        deps: &Collaborators<'_>,
    ) -> Action {
        let handled = handlers::run(state, ctx, deps);
        let result = match self.config.state_timeout() {
            Some(limit) => match tokio::time::timeout(limit, handled).await {
                Ok(result) => result,
                Err(_) => Err(Halt::Failed(ResolveFailure::Timeout(state))),
            },
            None => handled.await,
        };

        match result {
            Ok(action) => action,
            Err(Halt::Cancelled) => Action::Cancelled,
            Err(Halt::Failed(failure)) => {
                warn!("deep link failed in {state}: {failure}");
                Action::Errored(failure.to_string())
            }
        }
    }

    /// The single exit point: report the outcome, then reset the context.
    async fn finish(&self, ctx: &mut ResolutionContext, action: Action) -> Outcome {
        let outcome = match action {
            Action::Resolved => {
                let uri = ctx.raw_uri.clone().unwrap_or_default();
                info!("deep link resolved: {}", redact_query(&uri));
                self.sink
                    .show_info(&format!("Deep link resolved: {uri}"))
                    .await;
                Outcome::Resolved
            }
            Action::Cancelled => {
                info!("deep link cancelled");
                Outcome::Cancelled
            }
            Action::Errored(message) => {
                let message = if message.is_empty() {
                    UNKNOWN_ERROR.to_string()
                } else {
                    message
                };
                self.sink
                    .show_error(&format!("Error resolving deep link: {message}"))
                    .await;
                Outcome::Errored(message)
            }
            other => {
                warn!("reached idle on unexpected {}", other.label());
                Outcome::Errored(UNKNOWN_ERROR.to_string())
            }
        };

        self.set_in_flight(None);
        ctx.reset();
        self.publish(ctx);
        outcome
    }

    fn publish(&self, ctx: &ResolutionContext) {
        self.snapshot_tx.send_replace(ctx.clone());
    }

    fn set_in_flight(&self, token: Option<CancellationToken>) {
        match self.in_flight.lock() {
            Ok(mut guard) => *guard = token,
            Err(_) => warn!("in-flight token lock poisoned"),
        }
    }
}

/// Next state for `action`. A pair missing from the transition table ends the
/// resolution with an unknown-state error.
fn advance(state: State, action: Action) -> (State, Action) {
    match transition(state, &action) {
        Some(next) => (next, action),
        None => {
            warn!("no transition from {state} on {}", action.label());
            (
                State::Idle,
                Action::Errored(ResolveFailure::UnknownState.to_string()),
            )
        }
    }
}

/// Exclusive hold on the context for one submission.
struct ActiveResolution<'a> {
    engine: &'a Engine,
    ctx: MutexGuard<'a, ResolutionContext>,
}

impl Drop for ActiveResolution<'_> {
    fn drop(&mut self) {
        if self.ctx.is_idle() {
            return;
        }
        warn!("deep link abandoned in {}; resetting", self.ctx.state);
        self.engine.set_in_flight(None);
        self.ctx.reset();
        self.engine.publish(&self.ctx);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn advance_follows_the_table() {
        assert_eq!(
            advance(State::RepoMatch, Action::RepoMatchedWithId),
            (State::RemoteMatch, Action::RepoMatchedWithId)
        );
        assert_eq!(
            advance(State::OpenTarget, Action::Resolved),
            (State::Idle, Action::Resolved)
        );
    }

    #[test]
    fn undefined_pair_ends_with_unknown_state() {
        assert_eq!(
            advance(State::RemoteMatch, Action::TargetMatched),
            (State::Idle, Action::Errored("Unknown state.".to_string()))
        );
        assert_eq!(
            advance(State::Idle, Action::Resolved),
            (State::Idle, Action::Errored("Unknown state.".to_string()))
        );
    }
}
