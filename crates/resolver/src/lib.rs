//! # Repolink Resolver
//!
//! Resolves a parsed deep link into a concrete repository target and hands the
//! result to an action sink.
//!
//! ## Architecture
//!
//! ```text
//! LinkEvent
//!     │
//!     ├──> Engine::submit (idle guard, validation)
//!     │
//!     ├──> State loop (transition table + per-state handlers)
//!     │      ├─ RepoMatch      ─ match by remote URL, then by repo id
//!     │      ├─ RemoteMatch    ─ pick the remote with the link's URL
//!     │      ├─ TargetMatch    ─ branch / tag / commit -> sha
//!     │      └─ OpenTarget     ─ follow-up action
//!     │
//!     └──> Idle (single exit: message + context reset)
//! ```
//!
//! ## Example
//!
//! ```no_run
//! use repolink_protocol::LinkEvent;
//! use repolink_resolver::{Engine, RecordingSink, RepositoryProvider};
//! use std::sync::Arc;
//!
//! async fn run(provider: Arc<dyn RepositoryProvider>) {
//!     let sink = Arc::new(RecordingSink::default());
//!     let engine = Engine::new(provider, sink.clone());
//!     let event = LinkEvent::remote("abc", "https://x/y.git", "vscode://x/repolink/abc");
//!     let submission = engine.submit(event).await;
//!     println!("{submission:?}: {:?}", sink.records());
//! }
//! ```

mod config;
mod context;
mod engine;
mod error;
mod handlers;
mod provider;
mod sink;
mod state;
mod target;

pub use config::ResolverConfig;
pub use context::ResolutionContext;
pub use engine::{Engine, Outcome, Submission};
pub use error::{ResolveFailure, ResolverError, Result};
pub use provider::{
    Branch, ProviderError, ProviderResult, Remote, RemoteFilter, Repository, RepositoryProvider,
    Tag,
};
pub use sink::{ActionSink, RecordingSink};
pub use state::{transition, Action, State};
pub use target::{remote_branch_name, resolve_target_sha};
