use serde::Serialize;

/// Where a facade result came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Source {
    /// Authoritative answer from the remote API
    Remote,
    /// Served from the in-memory lookup cache
    Cache,
    /// Remote call failed; served from local fallback storage
    Local,
}

/// Facade return value tagged with its provenance
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Fetched<T> {
    pub data: T,
    pub source: Source,
    /// The remote failure that forced a local fallback
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T> Fetched<T> {
    pub fn remote(data: T) -> Self {
        Self {
            data,
            source: Source::Remote,
            error: None,
        }
    }

    pub fn cached(data: T) -> Self {
        Self {
            data,
            source: Source::Cache,
            error: None,
        }
    }

    pub fn local(data: T, error: impl ToString) -> Self {
        Self {
            data,
            source: Source::Local,
            error: Some(error.to_string()),
        }
    }

    /// True when the data may be stale because the remote was unreachable
    pub fn is_degraded(&self) -> bool {
        self.source == Source::Local
    }

    pub fn into_inner(self) -> T {
        self.data
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Fetched<U> {
        Fetched {
            data: f(self.data),
            source: self.source,
            error: self.error,
        }
    }
}
