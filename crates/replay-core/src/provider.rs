//! Provider Abstraction
//!
//! [`ResourceProvider`] is the boundary between the replay engine and the
//! implementation under test. It has one method per [`CallKind`], each taking
//! the concrete decoded request. How the implementation is reached (in
//! process, over a transport) is the implementor's business; the engine only
//! ever calls these methods, one at a time, in transcript order.
//!
//! Every method defaults to an "unimplemented" error, so an implementation
//! only needs to override the endpoints its transcripts exercise.
//!
//! The `Display` form of a returned error is the message compared against a
//! transcript's recorded `errors`. With `anyhow`, that is the outermost
//! message only; context added by the implementation is part of it.

use std::collections::{HashMap, VecDeque};

use anyhow::{anyhow, Context, Result};
use parking_lot::Mutex;
use provider_replay_types::schema::*;
use provider_replay_types::{kinds, CallKind, CallSchema};
use serde_json::Value;

/// Error returned by endpoints an implementation does not provide.
pub fn unimplemented(kind: CallKind) -> anyhow::Error {
    anyhow!("method {} is not implemented", kind.method_path())
}

/// A live resource provider implementation.
pub trait ResourceProvider: Send + Sync {
    /// Name used in logs.
    fn name(&self) -> &str {
        "provider"
    }

    fn get_schema(&self, _request: GetSchemaRequest) -> Result<GetSchemaResponse> {
        Err(unimplemented(CallKind::GetSchema))
    }

    fn check_config(&self, _request: CheckRequest) -> Result<CheckResponse> {
        Err(unimplemented(CallKind::CheckConfig))
    }

    fn diff_config(&self, _request: DiffRequest) -> Result<DiffResponse> {
        Err(unimplemented(CallKind::DiffConfig))
    }

    fn configure(&self, _request: ConfigureRequest) -> Result<ConfigureResponse> {
        Err(unimplemented(CallKind::Configure))
    }

    fn invoke(&self, _request: InvokeRequest) -> Result<InvokeResponse> {
        Err(unimplemented(CallKind::Invoke))
    }

    fn call(&self, _request: CallRequest) -> Result<CallResponse> {
        Err(unimplemented(CallKind::Call))
    }

    /// Validate and normalize resource inputs.
    fn check(&self, _request: CheckRequest) -> Result<CheckResponse> {
        Err(unimplemented(CallKind::Check))
    }

    /// Compare prior state with proposed (checked) inputs.
    fn diff(&self, _request: DiffRequest) -> Result<DiffResponse> {
        Err(unimplemented(CallKind::Diff))
    }

    fn create(&self, _request: CreateRequest) -> Result<CreateResponse> {
        Err(unimplemented(CallKind::Create))
    }

    fn read(&self, _request: ReadRequest) -> Result<ReadResponse> {
        Err(unimplemented(CallKind::Read))
    }

    fn update(&self, _request: UpdateRequest) -> Result<UpdateResponse> {
        Err(unimplemented(CallKind::Update))
    }

    fn delete(&self, _request: DeleteRequest) -> Result<Empty> {
        Err(unimplemented(CallKind::Delete))
    }

    fn construct(&self, _request: ConstructRequest) -> Result<ConstructResponse> {
        Err(unimplemented(CallKind::Construct))
    }

    fn cancel(&self, _request: Empty) -> Result<Empty> {
        Err(unimplemented(CallKind::Cancel))
    }

    fn get_plugin_info(&self, _request: Empty) -> Result<PluginInfo> {
        Err(unimplemented(CallKind::GetPluginInfo))
    }

    fn attach(&self, _request: PluginAttach) -> Result<Empty> {
        Err(unimplemented(CallKind::Attach))
    }

    fn get_mapping(&self, _request: GetMappingRequest) -> Result<GetMappingResponse> {
        Err(unimplemented(CallKind::GetMapping))
    }

    fn get_mappings(&self, _request: GetMappingsRequest) -> Result<GetMappingsResponse> {
        Err(unimplemented(CallKind::GetMappings))
    }
}

/// A provider that implements nothing.
pub struct UnimplementedProvider;

impl ResourceProvider for UnimplementedProvider {
    fn name(&self) -> &str {
        "unimplemented"
    }
}

/// A canned reply for one call.
#[derive(Debug, Clone, PartialEq)]
pub enum MockReply {
    /// Succeed with this response (decoded into the endpoint's response type).
    Respond(Value),
    /// Fail with this exact message.
    Fail(String),
}

/// A call received by a [`MockProvider`].
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedCall {
    pub method: CallKind,
    pub request: Value,
}

/// A mock provider for testing that returns pre-configured replies.
///
/// Replies are queued per endpoint. Each call takes the next reply; the last
/// one stays in place and answers every later call. All requests are
/// recorded so tests can assert on exactly what the engine sent.
///
/// # Example
/// ```
/// use provider_replay_core::provider::{MockProvider, ResourceProvider};
/// use provider_replay_types::schema::CheckRequest;
/// use provider_replay_types::CallKind;
/// use serde_json::json;
///
/// let provider = MockProvider::new("test")
///     .respond(CallKind::Check, json!({"inputs": {"size": 3}}))
///     .fail(CallKind::Create, "quota exceeded");
///
/// let checked = provider.check(CheckRequest::default()).unwrap();
/// assert_eq!(checked.inputs.unwrap()["size"], json!(3));
/// assert_eq!(provider.calls_of(CallKind::Check).len(), 1);
/// ```
#[derive(Debug, Default)]
pub struct MockProvider {
    name: String,
    replies: Mutex<HashMap<CallKind, VecDeque<MockReply>>>,
    calls: Mutex<Vec<RecordedCall>>,
}

impl MockProvider {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            ..Self::default()
        }
    }

    /// Queue a successful reply for `kind`.
    pub fn respond(self, kind: CallKind, response: Value) -> Self {
        self.push_reply(kind, MockReply::Respond(response));
        self
    }

    /// Queue a failing reply for `kind`.
    pub fn fail(self, kind: CallKind, message: impl Into<String>) -> Self {
        self.push_reply(kind, MockReply::Fail(message.into()));
        self
    }

    pub fn push_reply(&self, kind: CallKind, reply: MockReply) {
        self.replies.lock().entry(kind).or_default().push_back(reply);
    }

    /// Every call received so far, in order.
    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().clone()
    }

    /// Requests received for one endpoint, in order.
    pub fn calls_of(&self, kind: CallKind) -> Vec<Value> {
        self.calls
            .lock()
            .iter()
            .filter(|call| call.method == kind)
            .map(|call| call.request.clone())
            .collect()
    }

    fn next_reply(&self, kind: CallKind) -> Option<MockReply> {
        let mut replies = self.replies.lock();
        let queue = replies.get_mut(&kind)?;
        if queue.len() > 1 {
            queue.pop_front()
        } else {
            queue.front().cloned()
        }
    }

    fn reply<K: CallSchema>(&self, request: &K::Request) -> Result<K::Response> {
        let recorded = serde_json::to_value(request)
            .with_context(|| format!("encoding {} request for the call log", K::KIND))?;
        self.calls.lock().push(RecordedCall {
            method: K::KIND,
            request: recorded,
        });

        match self.next_reply(K::KIND) {
            Some(MockReply::Respond(response)) => serde_json::from_value(response)
                .with_context(|| format!("canned {} response has the wrong shape", K::KIND)),
            Some(MockReply::Fail(message)) => Err(anyhow::Error::msg(message)),
            None => Err(unimplemented(K::KIND)),
        }
    }
}

macro_rules! mock_endpoints {
    ($($method:ident => $marker:ident;)*) => {
        $(
            fn $method(
                &self,
                request: <kinds::$marker as CallSchema>::Request,
            ) -> Result<<kinds::$marker as CallSchema>::Response> {
                self.reply::<kinds::$marker>(&request)
            }
        )*
    };
}

impl ResourceProvider for MockProvider {
    fn name(&self) -> &str {
        &self.name
    }

    mock_endpoints! {
        get_schema => GetSchema;
        check_config => CheckConfig;
        diff_config => DiffConfig;
        configure => Configure;
        invoke => Invoke;
        call => Call;
        check => Check;
        diff => Diff;
        create => Create;
        read => Read;
        update => Update;
        delete => Delete;
        construct => Construct;
        cancel => Cancel;
        get_plugin_info => GetPluginInfo;
        attach => Attach;
        get_mapping => GetMapping;
        get_mappings => GetMappings;
    }
}
