//! Registry binding each [`CallKind`] to its provider method.
//!
//! A [`Handler`] decodes a recorded request into the endpoint's concrete
//! type, invokes the provider, normalizes the live response and encodes it
//! back into a JSON value ready for pattern matching. All handlers are the
//! same generic routine instantiated per [`Dispatch`] impl, so the replay
//! path is written once for every endpoint.

use anyhow::Result;
use provider_replay_types::{kinds, CallKind, CallSchema, ReplayError, SchemaPart};
use serde_json::Value;
use tracing::trace;

use crate::normalize::sort_failures;
use crate::provider::ResourceProvider;

/// Invocation and response normalization for one endpoint.
pub trait Dispatch: CallSchema {
    fn invoke(provider: &dyn ResourceProvider, request: Self::Request) -> Result<Self::Response>;

    /// Canonicalize nondeterministic parts of a live response.
    fn normalize(_response: &mut Self::Response) {}
}

/// What the live provider did with a request.
#[derive(Debug, Clone, PartialEq)]
pub enum Invocation {
    /// The call succeeded; the normalized response as JSON.
    Responded(Value),
    /// The call failed with this message.
    Failed(String),
}

type RunFn = fn(&dyn ResourceProvider, &Value, usize) -> Result<Invocation, ReplayError>;

/// Type-erased dispatch entry for one [`CallKind`].
#[derive(Clone, Copy)]
pub struct Handler {
    kind: CallKind,
    run: RunFn,
}

impl std::fmt::Debug for Handler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Handler").field("kind", &self.kind).finish()
    }
}

impl Handler {
    pub fn of<K: Dispatch>() -> Self {
        Self {
            kind: K::KIND,
            run: run::<K>,
        }
    }

    pub fn kind(&self) -> CallKind {
        self.kind
    }

    /// Decode `request`, call the provider and encode its normalized reply.
    ///
    /// Decode and encode problems are schema errors; a failing provider call
    /// is an [`Invocation::Failed`], not an error.
    pub fn run(
        &self,
        provider: &dyn ResourceProvider,
        request: &Value,
        line: usize,
    ) -> Result<Invocation, ReplayError> {
        (self.run)(provider, request, line)
    }
}

fn run<K: Dispatch>(
    provider: &dyn ResourceProvider,
    request: &Value,
    line: usize,
) -> Result<Invocation, ReplayError> {
    let decoded: K::Request =
        serde_json::from_value(request.clone()).map_err(|e| ReplayError::Schema {
            line,
            method: K::KIND,
            part: SchemaPart::Request,
            reason: e.to_string(),
        })?;

    match K::invoke(provider, decoded) {
        Ok(mut response) => {
            K::normalize(&mut response);
            let encoded = serde_json::to_value(&response).map_err(|e| ReplayError::Schema {
                line,
                method: K::KIND,
                part: SchemaPart::Response,
                reason: e.to_string(),
            })?;
            Ok(Invocation::Responded(encoded))
        }
        Err(err) => Ok(Invocation::Failed(err.to_string())),
    }
}

/// Look up the handler for `kind`.
pub fn handler(kind: CallKind) -> Handler {
    match kind {
        CallKind::GetSchema => Handler::of::<kinds::GetSchema>(),
        CallKind::CheckConfig => Handler::of::<kinds::CheckConfig>(),
        CallKind::DiffConfig => Handler::of::<kinds::DiffConfig>(),
        CallKind::Configure => Handler::of::<kinds::Configure>(),
        CallKind::Invoke => Handler::of::<kinds::Invoke>(),
        CallKind::Call => Handler::of::<kinds::Call>(),
        CallKind::Check => Handler::of::<kinds::Check>(),
        CallKind::Diff => Handler::of::<kinds::Diff>(),
        CallKind::Create => Handler::of::<kinds::Create>(),
        CallKind::Read => Handler::of::<kinds::Read>(),
        CallKind::Update => Handler::of::<kinds::Update>(),
        CallKind::Delete => Handler::of::<kinds::Delete>(),
        CallKind::Construct => Handler::of::<kinds::Construct>(),
        CallKind::Cancel => Handler::of::<kinds::Cancel>(),
        CallKind::GetPluginInfo => Handler::of::<kinds::GetPluginInfo>(),
        CallKind::Attach => Handler::of::<kinds::Attach>(),
        CallKind::GetMapping => Handler::of::<kinds::GetMapping>(),
        CallKind::GetMappings => Handler::of::<kinds::GetMappings>(),
    }
}

macro_rules! dispatch {
    ($($marker:ident => $method:ident;)*) => {
        $(
            impl Dispatch for kinds::$marker {
                fn invoke(
                    provider: &dyn ResourceProvider,
                    request: Self::Request,
                ) -> Result<Self::Response> {
                    provider.$method(request)
                }
            }
        )*
    };
}

macro_rules! dispatch_sorting_failures {
    ($($marker:ident => $method:ident;)*) => {
        $(
            impl Dispatch for kinds::$marker {
                fn invoke(
                    provider: &dyn ResourceProvider,
                    request: Self::Request,
                ) -> Result<Self::Response> {
                    provider.$method(request)
                }

                fn normalize(response: &mut Self::Response) {
                    if response.failures.len() > 1 {
                        trace!(
                            count = response.failures.len(),
                            "sorting {} failures",
                            Self::KIND
                        );
                    }
                    sort_failures(&mut response.failures);
                }
            }
        )*
    };
}

dispatch! {
    GetSchema => get_schema;
    DiffConfig => diff_config;
    Configure => configure;
    Diff => diff;
    Create => create;
    Read => read;
    Update => update;
    Delete => delete;
    Construct => construct;
    Cancel => cancel;
    GetPluginInfo => get_plugin_info;
    Attach => attach;
    GetMapping => get_mapping;
    GetMappings => get_mappings;
}

dispatch_sorting_failures! {
    CheckConfig => check_config;
    Invoke => invoke;
    Call => call;
    Check => check;
}
