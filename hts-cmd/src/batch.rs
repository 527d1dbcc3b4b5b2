//! Per-target batch runner.
//!
//! Targets are independent: each one runs on tokio's blocking pool, a
//! failure is logged with the target id and does not stop the others.

use log::{error, info};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::task::{Id, JoinSet};

/// Outcome of a batch run.
#[derive(Debug, Default)]
pub struct BatchReport {
    /// `(target id, rows written)`
    pub succeeded: Vec<(String, usize)>,
    /// `(target id, error message)`
    pub failed: Vec<(String, String)>,
}

impl BatchReport {
    pub fn rows_written(&self) -> usize {
        self.succeeded.iter().map(|(_, rows)| rows).sum()
    }

    /// `Err` naming the failed targets if there were any.
    pub fn into_result(self) -> anyhow::Result<()> {
        if self.failed.is_empty() {
            return Ok(());
        }
        let ids: Vec<&str> = self.failed.iter().map(|(id, _)| id.as_str()).collect();
        anyhow::bail!(
            "{} of {} targets failed: {}",
            self.failed.len(),
            self.failed.len() + self.succeeded.len(),
            ids.join(", ")
        )
    }
}

/// Run `work` once per `(id, item)` on the blocking pool and collect the
/// outcome of every target.
pub async fn run_batch<T, F>(label: &str, items: Vec<(String, T)>, work: F) -> BatchReport
where
    T: Send + 'static,
    F: Fn(&str, T) -> anyhow::Result<usize> + Send + Sync + 'static,
{
    let work = Arc::new(work);
    let mut set = JoinSet::new();
    let total = items.len();
    // Task id to target id, so a panicked task can still be named.
    let mut targets: HashMap<Id, String> = HashMap::with_capacity(total);

    for (id, item) in items {
        let work = Arc::clone(&work);
        let target = id.clone();
        let handle = set.spawn_blocking(move || {
            let outcome = work(&id, item);
            (id, outcome)
        });
        targets.insert(handle.id(), target);
    }

    let mut report = BatchReport::default();
    while let Some(joined) = set.join_next_with_id().await {
        match joined {
            Ok((_, (id, Ok(rows)))) => {
                info!("[HTS Debug] {}: {} wrote {} rows", label, id, rows);
                report.succeeded.push((id, rows));
            }
            Ok((_, (id, Err(e)))) => {
                error!("{}: target {} failed: {:#}", label, id, e);
                report.failed.push((id, format!("{:#}", e)));
            }
            Err(e) => {
                let id = targets
                    .remove(&e.id())
                    .unwrap_or_else(|| format!("task {}", e.id()));
                error!("{}: target {} did not complete: {}", label, id, e);
                report.failed.push((id, e.to_string()));
            }
        }
    }

    info!(
        "[HTS Debug] {}: {} of {} targets succeeded, {} rows written",
        label,
        report.succeeded.len(),
        total,
        report.rows_written()
    );
    report
}
