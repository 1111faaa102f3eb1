use std::fmt;

use crate::{validate, ValidationError};

/// Name of the query parameter that carries the API key.
pub const CREDENTIAL_PARAM: &str = "api_key";

/// Scalar query parameter value.
#[derive(Clone, Debug, PartialEq)]
pub enum QueryValue {
    Text(String),
    Integer(i64),
    Float(f64),
    Bool(bool),
}

impl QueryValue {
    pub fn text(value: impl Into<String>) -> Self {
        Self::Text(value.into())
    }

    pub fn integer(value: i64) -> Self {
        Self::Integer(value)
    }

    pub fn float(value: f64) -> Self {
        Self::Float(value)
    }
}

impl fmt::Display for QueryValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text(value) => f.write_str(value),
            Self::Integer(value) => write!(f, "{value}"),
            Self::Float(value) => write!(f, "{value}"),
            Self::Bool(value) => f.write_str(if *value { "true" } else { "false" }),
        }
    }
}

impl From<String> for QueryValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<&str> for QueryValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_owned())
    }
}

impl From<i64> for QueryValue {
    fn from(value: i64) -> Self {
        Self::Integer(value)
    }
}

impl From<i32> for QueryValue {
    fn from(value: i32) -> Self {
        Self::Integer(value.into())
    }
}

impl From<u32> for QueryValue {
    fn from(value: u32) -> Self {
        Self::Integer(value.into())
    }
}

impl From<f64> for QueryValue {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

impl From<bool> for QueryValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

/// Ordered query parameters with unique keys.
///
/// Inserting an existing key replaces its value in place. Optional values
/// that are `None` are never stored, so they are omitted from the query
/// string rather than sent empty.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct QueryParams {
    pairs: Vec<(String, QueryValue)>,
}

impl QueryParams {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<QueryValue>) -> &mut Self {
        let key = key.into();
        let value = value.into();
        match self.pairs.iter_mut().find(|(existing, _)| *existing == key) {
            Some(slot) => slot.1 = value,
            None => self.pairs.push((key, value)),
        }
        self
    }

    pub fn insert_opt<V: Into<QueryValue>>(
        &mut self,
        key: impl Into<String>,
        value: Option<V>,
    ) -> &mut Self {
        if let Some(value) = value {
            self.insert(key, value);
        }
        self
    }

    /// Builder-style [`QueryParams::insert`].
    pub fn with(mut self, key: impl Into<String>, value: impl Into<QueryValue>) -> Self {
        self.insert(key, value);
        self
    }

    pub fn get(&self, key: &str) -> Option<&QueryValue> {
        self.pairs
            .iter()
            .find(|(existing, _)| existing == key)
            .map(|(_, value)| value)
    }

    /// Moves every pair of `other` into `self`, replacing duplicates.
    pub fn extend(&mut self, other: QueryParams) -> &mut Self {
        for (key, value) in other.pairs {
            self.insert(key, value);
        }
        self
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &QueryValue)> {
        self.pairs.iter().map(|(key, value)| (key.as_str(), value))
    }

    /// Renders the pairs as strings, ready for the query string.
    pub(crate) fn to_pairs(&self) -> Vec<(String, String)> {
        self.pairs
            .iter()
            .map(|(key, value)| (key.clone(), value.to_string()))
            .collect()
    }
}

impl<K, V> FromIterator<(K, V)> for QueryParams
where
    K: Into<String>,
    V: Into<QueryValue>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut params = Self::new();
        for (key, value) in iter {
            params.insert(key, value);
        }
        params
    }
}

impl<K, V, const N: usize> From<[(K, V); N]> for QueryParams
where
    K: Into<String>,
    V: Into<QueryValue>,
{
    fn from(pairs: [(K, V); N]) -> Self {
        pairs.into_iter().collect()
    }
}

impl From<()> for QueryParams {
    fn from(_: ()) -> Self {
        Self::default()
    }
}

/// One endpoint call: a relative path plus its query parameters.
#[derive(Clone, Debug, PartialEq)]
pub struct EndpointRequest {
    /// Path relative to the base address, without a leading `/`.
    pub path: String,
    pub params: QueryParams,
}

impl EndpointRequest {
    pub fn new<P: Into<QueryParams>>(path: impl AsRef<str>, params: P) -> Self {
        Self {
            path: path.as_ref().trim_start_matches('/').to_owned(),
            params: params.into(),
        }
    }

    /// Every PropertyData endpoint is authenticated.
    pub fn requires_credential(&self) -> bool {
        true
    }
}

/// Location filters shared by the area endpoints.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct LocationQuery {
    pub postcode: Option<String>,
    /// `lat,lng`
    pub location: Option<String>,
    /// what3words address
    pub w3w: Option<String>,
    pub town: Option<String>,
}

impl LocationQuery {
    pub fn postcode(postcode: impl Into<String>) -> Self {
        Self {
            postcode: Some(postcode.into()),
            ..Self::default()
        }
    }

    pub fn location(location: impl Into<String>) -> Self {
        Self {
            location: Some(location.into()),
            ..Self::default()
        }
    }

    /// Validates every non-empty field, requires at least one, and returns
    /// the present fields as query parameters.
    pub fn into_params(self) -> Result<QueryParams, ValidationError> {
        validate::location_required([
            self.postcode.as_deref(),
            self.location.as_deref(),
            self.w3w.as_deref(),
            self.town.as_deref(),
        ])?;

        let mut params = QueryParams::new();
        if let Some(postcode) = non_empty(self.postcode) {
            validate::postcode(&postcode)?;
            params.insert("postcode", postcode);
        }
        if let Some(location) = non_empty(self.location) {
            validate::location(&location)?;
            params.insert("location", location);
        }
        if let Some(w3w) = non_empty(self.w3w) {
            validate::three_word_address(&w3w)?;
            params.insert("w3w", w3w);
        }
        if let Some(town) = non_empty(self.town) {
            validate::town(&town)?;
            params.insert("town", town);
        }
        Ok(params)
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|value| !value.is_empty())
}

/// Page selection for list endpoints.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Pagination {
    pub page: u32,
    pub per_page: u32,
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            page: 1,
            per_page: 20,
        }
    }
}

impl Pagination {
    pub fn into_params(self) -> Result<QueryParams, ValidationError> {
        validate::pagination(self.page, self.per_page)?;
        Ok(QueryParams::from([
            ("page", self.page),
            ("per_page", self.per_page),
        ]))
    }
}
