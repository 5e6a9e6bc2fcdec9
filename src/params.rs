// Search-parameter reader: pulls the destination, stay dates and guest count
// out of a results-page location (path plus query string). No validation of
// date format or guest-count shape happens at this layer; absent parameters
// stay None and are simply omitted from outgoing requests.

// Parameters of one search. The tuple is the request identity: any change
// means price polling restarts from scratch.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchParams {
    pub destination_id: Option<String>,
    pub checkin: Option<String>,
    pub checkout: Option<String>,
    pub guests: Option<String>,
}

impl SearchParams {
    // Parse a results-page location like
    // `/results/RsBU?checkin=2025-10-01&checkout=2025-10-07&guests=2`.
    pub fn from_url(url: &str) -> Self {
        let (path, query) = match url.split_once('?') {
            Some((path, query)) => (path, query),
            None => (url, ""),
        };
        Self::from_parts(path, query)
    }

    pub fn from_parts(path: &str, query: &str) -> Self {
        Self {
            destination_id: destination_from_path(path),
            checkin: query_value(query, "checkin"),
            checkout: query_value(query, "checkout"),
            guests: query_value(query, "guests"),
        }
    }

    // Key identifying the price request this parameter set maps to. Compared
    // by the session to decide when polling must start over.
    pub fn request_key(&self) -> String {
        format!(
            "{}:{}:{}:{}",
            self.destination_id.as_deref().unwrap_or(""),
            self.checkin.as_deref().unwrap_or(""),
            self.checkout.as_deref().unwrap_or(""),
            self.guests.as_deref().unwrap_or("")
        )
    }
}

// The destination id is the path segment following `results`, e.g.
// `/results/RsBU` -> `RsBU`. Anything else yields None.
fn destination_from_path(path: &str) -> Option<String> {
    let mut segments = path.split('/').filter(|s| !s.is_empty());
    while let Some(segment) = segments.next() {
        if segment == "results" {
            return segments.next().map(str::to_string);
        }
    }
    None
}

// First value for `key` in the query string, mirroring URLSearchParams.get.
// A bare key without `=` counts as present-but-empty and is ignored.
fn query_value(query: &str, key: &str) -> Option<String> {
    query
        .split('&')
        .filter_map(|pair| pair.split_once('='))
        .find(|(k, _)| *k == key)
        .map(|(_, v)| v.to_string())
        .filter(|v| !v.is_empty())
}
