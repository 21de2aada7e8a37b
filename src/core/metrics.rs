use metrics::counter;

pub(crate) const API_REQUESTS_TOTAL: &str = "prestasi_api_requests_total";
pub(crate) const API_FAILURES_TOTAL: &str = "prestasi_api_failures_total";
pub(crate) const STALE_RESPONSES_TOTAL: &str = "prestasi_stale_responses_total";

pub(crate) fn record_request(method: &reqwest::Method) {
    counter!(API_REQUESTS_TOTAL, "method" => method.as_str().to_string()).increment(1);
}

pub(crate) fn record_failure(method: &reqwest::Method, kind: &'static str) {
    counter!(API_FAILURES_TOTAL, "method" => method.as_str().to_string(), "kind" => kind)
        .increment(1);
}

pub(crate) fn record_stale_response(view: &'static str) {
    counter!(STALE_RESPONSES_TOTAL, "view" => view).increment(1);
}
