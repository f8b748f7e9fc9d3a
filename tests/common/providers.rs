//! In-memory providers for replay tests.

use std::collections::HashMap;

use anyhow::{anyhow, Result};
use parking_lot::Mutex;
use provider_replay::schema::*;
use provider_replay::ResourceProvider;
use serde_json::{json, Value};

/// A provider whose resources are integer counters.
///
/// Version 1 passes `Check` inputs through untouched. Version 2 parses a
/// string `start` into a number, so a diff against inputs recorded by
/// version 1 reports a change.
pub struct CounterProvider {
    version: u32,
    state: Mutex<CounterState>,
}

#[derive(Default)]
struct CounterState {
    next_id: u64,
    values: HashMap<String, i64>,
}

impl CounterProvider {
    pub fn v1() -> Self {
        Self::new(1)
    }

    pub fn v2() -> Self {
        Self::new(2)
    }

    fn new(version: u32) -> Self {
        Self {
            version,
            state: Mutex::new(CounterState::default()),
        }
    }

    fn value_response(value: i64) -> Option<PropertyMap> {
        json!({ "value": value }).as_object().cloned()
    }
}

fn int_property(properties: &Option<PropertyMap>, key: &str) -> i64 {
    properties
        .as_ref()
        .and_then(|props| props.get(key))
        .and_then(Value::as_i64)
        .unwrap_or(0)
}

impl ResourceProvider for CounterProvider {
    fn name(&self) -> &str {
        "counter"
    }

    fn check(&self, request: CheckRequest) -> Result<CheckResponse> {
        let mut inputs = request.news.unwrap_or_default();
        if self.version >= 2 {
            if let Some(Value::String(raw)) = inputs.get("start") {
                let parsed: i64 = raw.parse()?;
                inputs.insert("start".to_string(), json!(parsed));
            }
        }
        Ok(CheckResponse {
            inputs: Some(inputs),
            failures: Vec::new(),
        })
    }

    fn diff(&self, request: DiffRequest) -> Result<DiffResponse> {
        let olds = request.olds.unwrap_or_default();
        let news = request.news.unwrap_or_default();
        let mut diffs: Vec<String> = news
            .iter()
            .filter(|(key, value)| olds.get(*key) != Some(*value))
            .map(|(key, _)| key.clone())
            .collect();
        diffs.sort();
        Ok(DiffResponse {
            changes: if diffs.is_empty() {
                DiffChanges::None
            } else {
                DiffChanges::Some
            },
            diffs,
            ..Default::default()
        })
    }

    fn create(&self, request: CreateRequest) -> Result<CreateResponse> {
        let start = int_property(&request.properties, "start");
        let mut state = self.state.lock();
        state.next_id += 1;
        let id = format!("counter-{}", state.next_id);
        state.values.insert(id.clone(), start);
        Ok(CreateResponse {
            id,
            properties: Self::value_response(start),
            ..Default::default()
        })
    }

    fn update(&self, request: UpdateRequest) -> Result<UpdateResponse> {
        let step = int_property(&request.news, "step");
        let mut state = self.state.lock();
        let value = state
            .values
            .get_mut(&request.id)
            .ok_or_else(|| anyhow!("counter {} not found", request.id))?;
        *value += step;
        Ok(UpdateResponse {
            properties: Self::value_response(*value),
            ..Default::default()
        })
    }

    fn read(&self, request: ReadRequest) -> Result<ReadResponse> {
        let value = *self
            .state
            .lock()
            .values
            .get(&request.id)
            .ok_or_else(|| anyhow!("counter {} not found", request.id))?;
        Ok(ReadResponse {
            id: request.id,
            properties: Self::value_response(value),
            ..Default::default()
        })
    }

    fn delete(&self, request: DeleteRequest) -> Result<Empty> {
        self.state
            .lock()
            .values
            .remove(&request.id)
            .map(|_| Empty {})
            .ok_or_else(|| anyhow!("counter {} not found", request.id))
    }
}
