//! Ordered key/value bag backing the query and form parameters of a request.

use std::borrow::Cow;

use indexmap::IndexMap;
use log::trace;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Parameters {
    values: IndexMap<String, String>,
}

impl Parameters {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_map<I, K, V>(values: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            values: values
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }

    /// Parses `a=1&b=two+words`. Later duplicates overwrite earlier keys.
    pub fn from_query(query: &str) -> Self {
        let mut params = Self::new();
        for pair in query.split('&').filter(|pair| !pair.is_empty()) {
            let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
            let key = decode(key);
            if key.is_empty() {
                continue;
            }
            params.values.insert(key, decode(value));
        }
        trace!("parsed {} parameters", params.len());
        params
    }

    pub fn to_map(&self) -> IndexMap<String, String> {
        self.values.clone()
    }

    pub fn to_query(&self) -> String {
        self.values
            .iter()
            .map(|(k, v)| format!("{}={}", urlencoding::encode(k), urlencoding::encode(v)))
            .collect::<Vec<_>>()
            .join("&")
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    pub fn set(&mut self, key: &str, value: &str) {
        self.values.insert(key.to_string(), value.to_string());
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

fn decode(raw: &str) -> String {
    let raw = raw.replace('+', " ");
    // not valid UTF-8 once decoded; keep it as sent
    urlencoding::decode(&raw)
        .map(Cow::into_owned)
        .unwrap_or(raw)
}
