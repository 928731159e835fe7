//! Query-string parsing
//!
//! Parameters are `application/x-www-form-urlencoded`. When a name repeats the
//! last value wins and values are trimmed, matching what DownloadStation
//! clients expect from the server they were written against.

use url::form_urlencoded;

/// Parsed request query
#[derive(Debug, Default, Clone)]
pub struct Query {
    pairs: Vec<(String, String)>,
}

impl Query {
    pub fn parse(raw: Option<&str>) -> Self {
        let pairs = raw
            .map(|q| form_urlencoded::parse(q.as_bytes()).into_owned().collect())
            .unwrap_or_default();
        Self { pairs }
    }

    /// Value of `name`, or `None` when absent
    pub fn get(&self, name: &str) -> Option<&str> {
        self.pairs
            .iter()
            .rev()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.trim())
    }
}
