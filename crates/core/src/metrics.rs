//! Quality Metrics Synthesis
//!
//! When the engine completes a job without a metrics projection, a rough one
//! is derived from the issue list.

use crate::models::{
    ComplexityDistribution, Issue, JobStatusSnapshot, LifecycleState, QualityMetrics, Severity,
};

/// Metrics reported when a completed job has no issues at all.
const CLEAN_METRICS: QualityMetrics = QualityMetrics {
    test_coverage_pct: 85.0,
    duplication_pct: 5.0,
    technical_debt_hours: 0.0,
    complexity_distribution: ComplexityDistribution {
        low: 100,
        medium: 0,
        high: 0,
    },
};

/// Metrics projection of a snapshot.
///
/// `None` unless the job is `completed`. A remote projection wins; otherwise
/// the projection is synthesized from the snapshot's issues (an absent list
/// counts as no issues).
pub fn project_metrics(snapshot: &JobStatusSnapshot) -> Option<QualityMetrics> {
    if snapshot.state != LifecycleState::Completed {
        return None;
    }
    if let Some(metrics) = &snapshot.metrics {
        return Some(metrics.clone());
    }
    Some(synthesize_metrics(snapshot.issues.as_deref().unwrap_or(&[])))
}

/// Derive metrics from raw issues.
pub fn synthesize_metrics(issues: &[Issue]) -> QualityMetrics {
    let total = issues.len();
    if total == 0 {
        return CLEAN_METRICS;
    }

    let count = |severity: Severity| issues.iter().filter(|i| i.severity == severity).count();
    let high = count(Severity::High);
    let medium = count(Severity::Medium);
    let low = count(Severity::Low);

    let total_f = total as f64;
    let share = |n: usize| ((n as f64 / total_f) * 100.0).round() as u32;

    QualityMetrics {
        test_coverage_pct: (90.0 - 2.0 * total_f).max(20.0),
        duplication_pct: (1.5 * total_f).min(50.0),
        technical_debt_hours: 2.0 * high as f64 + medium as f64 + 0.5 * low as f64,
        complexity_distribution: ComplexityDistribution {
            low: share(low),
            medium: share(medium),
            high: share(high),
        },
    }
}
