//! Remote job-set inspection.
//!
//! A job-set aggregates possibly-multiple sub-jobs. The payload is treated
//! as opaque except for two documented traversals: deriving an overall
//! status and digging out a result URL.

use serde_json::Value;

const COMPLETED_STATUSES: [&str; 3] = ["completed", "success", "succeeded"];
const FAILED_STATUSES: [&str; 2] = ["failed", "error"];
const URL_KEYS: [&str; 3] = ["url", "asset_url", "download_url"];
const RESULT_BUCKETS: [&str; 3] = ["results", "output", "outputs"];

/// Overall status derived from a job-set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JobSetStatus {
    Completed,
    Failed,
    /// Anything non-terminal, carrying the reported status string
    Pending(String),
}

/// An external job-set payload.
#[derive(Debug, Clone)]
pub struct JobSet {
    raw: Value,
}

impl JobSet {
    pub fn new(raw: Value) -> Self {
        Self { raw }
    }

    /// The raw remote document.
    pub fn raw(&self) -> &Value {
        &self.raw
    }

    fn sub_jobs(&self) -> Option<&Vec<Value>> {
        self.raw.get("jobs").and_then(|j| j.as_array())
    }

    /// Derive the overall status.
    ///
    /// Completed iff every sub-job reports a completed-family status; failed
    /// iff any reports a failed-family status; otherwise the top-level
    /// `status`/`overall_status` field decides, defaulting to `queued`.
    pub fn status(&self) -> JobSetStatus {
        if let Some(jobs) = self.sub_jobs() {
            if !jobs.is_empty() {
                let statuses: Vec<&str> = jobs
                    .iter()
                    .map(|j| j.get("status").and_then(|s| s.as_str()).unwrap_or(""))
                    .collect();
                if statuses.iter().all(|s| COMPLETED_STATUSES.contains(s)) {
                    return JobSetStatus::Completed;
                }
                if statuses.iter().any(|s| FAILED_STATUSES.contains(s)) {
                    return JobSetStatus::Failed;
                }
            }
        }

        let top = self
            .raw
            .get("status")
            .or_else(|| self.raw.get("overall_status"))
            .and_then(|s| s.as_str())
            .unwrap_or("queued");

        if COMPLETED_STATUSES.contains(&top) {
            JobSetStatus::Completed
        } else if FAILED_STATUSES.contains(&top) {
            JobSetStatus::Failed
        } else {
            JobSetStatus::Pending(top.to_string())
        }
    }

    /// Find the result URL, if any.
    ///
    /// Traverses each sub-job's `results`/`output`/`outputs` container
    /// (map-of-lists, map-of-dicts, or list) looking for `url`/`asset_url`/
    /// `download_url`; first match wins, first sub-job wins. Falls back to a
    /// sub-job-level `result_url`, then a job-set-level `result_url`.
    pub fn result_url(&self) -> Option<String> {
        if let Some(jobs) = self.sub_jobs() {
            for job in jobs {
                for bucket in RESULT_BUCKETS {
                    if let Some(url) = url_in_container(job.get(bucket)) {
                        return Some(url);
                    }
                }
                if let Some(url) = job.get("result_url").and_then(|u| u.as_str()) {
                    return Some(url.to_string());
                }
            }
        }
        self.raw
            .get("result_url")
            .and_then(|u| u.as_str())
            .map(str::to_string)
    }

    /// Short representation for failure logs.
    pub fn summary(&self) -> String {
        let mut s = self.raw.to_string();
        if s.len() > 512 {
            s.truncate(512);
            s.push_str("...");
        }
        s
    }
}

fn url_in_item(item: &Value) -> Option<String> {
    let obj = item.as_object()?;
    for key in URL_KEYS {
        if let Some(url) = obj.get(key).and_then(|u| u.as_str()) {
            return Some(url.to_string());
        }
    }
    None
}

fn url_in_container(container: Option<&Value>) -> Option<String> {
    match container? {
        Value::Object(map) => {
            for values in map.values() {
                match values {
                    Value::Array(items) => {
                        for item in items {
                            if let Some(url) = url_in_item(item) {
                                return Some(url);
                            }
                        }
                    }
                    Value::Object(_) => {
                        if let Some(url) = url_in_item(values) {
                            return Some(url);
                        }
                    }
                    _ => {}
                }
            }
            None
        }
        Value::Array(items) => items.iter().find_map(url_in_item),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn nested_map_of_lists_wins() {
        let job_set = JobSet::new(json!({
            "jobs": [{
                "status": "completed",
                "results": {"raw": [{"url": "X"}]}
            }],
            "result_url": "Y"
        }));
        assert_eq!(job_set.result_url().as_deref(), Some("X"));
    }

    #[test]
    fn top_level_result_url_is_the_fallback() {
        let job_set = JobSet::new(json!({
            "jobs": [{"status": "completed", "results": {"raw": [{"size": 3}]}}],
            "result_url": "Y"
        }));
        assert_eq!(job_set.result_url().as_deref(), Some("Y"));
    }

    #[test]
    fn map_of_dicts_and_plain_list_containers() {
        let map_of_dicts = JobSet::new(json!({
            "jobs": [{"output": {"video": {"asset_url": "A"}}}]
        }));
        assert_eq!(map_of_dicts.result_url().as_deref(), Some("A"));

        let list = JobSet::new(json!({
            "jobs": [{"outputs": [{"download_url": "B"}]}]
        }));
        assert_eq!(list.result_url().as_deref(), Some("B"));
    }

    #[test]
    fn first_sub_job_wins() {
        let job_set = JobSet::new(json!({
            "jobs": [
                {"results": {"a": [{"url": "first"}]}},
                {"results": {"a": [{"url": "second"}]}}
            ]
        }));
        assert_eq!(job_set.result_url().as_deref(), Some("first"));
    }

    #[test]
    fn sub_job_result_url_beats_job_set_level() {
        let job_set = JobSet::new(json!({
            "jobs": [{"result_url": "sub"}],
            "result_url": "top"
        }));
        assert_eq!(job_set.result_url().as_deref(), Some("sub"));
    }

    #[test]
    fn status_requires_every_sub_job_complete() {
        let done = JobSet::new(json!({
            "jobs": [{"status": "succeeded"}, {"status": "completed"}]
        }));
        assert_eq!(done.status(), JobSetStatus::Completed);

        let mixed = JobSet::new(json!({
            "jobs": [{"status": "completed"}, {"status": "queued"}],
            "status": "in_progress"
        }));
        assert_eq!(mixed.status(), JobSetStatus::Pending("in_progress".into()));

        let failed = JobSet::new(json!({
            "jobs": [{"status": "completed"}, {"status": "error"}]
        }));
        assert_eq!(failed.status(), JobSetStatus::Failed);
    }

    #[test]
    fn status_falls_back_to_top_level_then_queued() {
        let top = JobSet::new(json!({"status": "failed"}));
        assert_eq!(top.status(), JobSetStatus::Failed);

        let empty = JobSet::new(json!({}));
        assert_eq!(empty.status(), JobSetStatus::Pending("queued".into()));
    }
}
