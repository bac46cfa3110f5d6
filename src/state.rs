use std::sync::Arc;
use std::time::Instant;

use crate::analysis::cache::AnalysisCache;
use crate::config::DEFAULT_WEEKLY_GOAL_KG;
use crate::db::DatabaseProxy;

/// Composition root for per-process services. The analysis cache lives here
/// (not in a module-level static) so tests and multiple server instances get
/// isolated state.
#[derive(Clone)]
pub struct AppState {
    started_at: Instant,
    db_proxy: Option<Arc<DatabaseProxy>>,
    analysis_cache: Arc<AnalysisCache>,
    weekly_goal_kg: f64,
}

impl AppState {
    pub fn new(db_proxy: Option<Arc<DatabaseProxy>>, weekly_goal_kg: f64) -> Self {
        Self {
            started_at: Instant::now(),
            db_proxy,
            analysis_cache: Arc::new(AnalysisCache::default()),
            weekly_goal_kg,
        }
    }

    pub fn without_database() -> Self {
        Self::new(None, DEFAULT_WEEKLY_GOAL_KG)
    }

    pub fn uptime_seconds(&self) -> u64 {
        self.started_at.elapsed().as_secs()
    }

    pub fn db_proxy(&self) -> Option<Arc<DatabaseProxy>> {
        self.db_proxy.clone()
    }

    pub fn analysis_cache(&self) -> Arc<AnalysisCache> {
        Arc::clone(&self.analysis_cache)
    }

    pub fn weekly_goal_kg(&self) -> f64 {
        self.weekly_goal_kg
    }
}
