//! Typed, per-kind views over a transcript.

use crate::error::{ReplayError, SchemaPart};
use crate::schema::{CallSchema, ResourceKeyed};
use crate::transcript::Entry;

/// One recorded call of kind `K`, decoded into its concrete shapes.
#[derive(Debug, Clone)]
pub struct Exchange<K: CallSchema> {
    pub line: usize,
    pub request: K::Request,
    /// `None` when the call was recorded as failing.
    pub response: Option<K::Response>,
    pub errors: Vec<String>,
}

/// All calls of kind `K` in transcript order.
///
/// Computed on demand from a transcript and never cached: build a new one if
/// the source changes.
#[derive(Debug, Clone)]
pub struct Projection<K: CallSchema> {
    exchanges: Vec<Exchange<K>>,
}

impl<K: CallSchema> Projection<K> {
    pub(crate) fn from_entries(entries: &[Entry]) -> Result<Self, ReplayError> {
        let mut exchanges = Vec::new();
        for entry in entries.iter().filter(|entry| entry.method == K::KIND) {
            let request = serde_json::from_value(entry.request.clone()).map_err(|e| {
                ReplayError::Schema {
                    line: entry.line,
                    method: K::KIND,
                    part: SchemaPart::Request,
                    reason: e.to_string(),
                }
            })?;
            let response = match (&entry.response, entry.errors.is_empty()) {
                (Some(response), true) => {
                    Some(serde_json::from_value(response.clone()).map_err(|e| {
                        ReplayError::Schema {
                            line: entry.line,
                            method: K::KIND,
                            part: SchemaPart::Response,
                            reason: e.to_string(),
                        }
                    })?)
                }
                _ => None,
            };
            exchanges.push(Exchange {
                line: entry.line,
                request,
                response,
                errors: entry.errors.clone(),
            });
        }
        Ok(Self { exchanges })
    }

    pub fn exchanges(&self) -> &[Exchange<K>] {
        &self.exchanges
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Exchange<K>> {
        self.exchanges.iter()
    }

    pub fn len(&self) -> usize {
        self.exchanges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.exchanges.is_empty()
    }
}

impl<K> Projection<K>
where
    K: CallSchema,
    K::Request: ResourceKeyed,
{
    /// Calls targeting `urn`, in transcript order.
    pub fn for_urn<'a>(&'a self, urn: &'a str) -> impl Iterator<Item = &'a Exchange<K>> + 'a {
        self.exchanges
            .iter()
            .filter(move |exchange| exchange.request.urn() == urn)
    }

    /// The last recorded call targeting `urn`.
    pub fn latest_for_urn(&self, urn: &str) -> Option<&Exchange<K>> {
        self.exchanges
            .iter()
            .rev()
            .find(|exchange| exchange.request.urn() == urn)
    }
}

impl<'a, K: CallSchema> IntoIterator for &'a Projection<K> {
    type Item = &'a Exchange<K>;
    type IntoIter = std::slice::Iter<'a, Exchange<K>>;

    fn into_iter(self) -> Self::IntoIter {
        self.exchanges.iter()
    }
}
