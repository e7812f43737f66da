//! # opsdash-sources
//!
//! Source adapters for opsdash: Travis CI, CircleCI, Jenkins, and Google
//! Analytics, all behind the one `SourceAdapter` contract the refresh
//! scheduler consumes. Backend API quirks (pagination, 404-means-no-CI,
//! version differences) stay inside the adapters.

mod adapter;

pub use adapter::{SourceAdapter, SourceData};

mod travis;

pub use travis::TravisSource;

mod circleci;

pub use circleci::CircleCiSource;

mod jenkins;

pub use jenkins::JenkinsSource;

mod analytics;

pub use analytics::AnalyticsSource;

use opsdash_core::DashConfig;
use std::sync::Arc;

/// Build every configured source instance in display order: analytics views
/// first, then Travis owners, CircleCI owners, and the Jenkins instance.
///
/// Disabled sources (required config absent) are logged once here and left
/// out, so the scheduler never sees them.
pub fn build_sources(config: &DashConfig) -> Vec<Arc<dyn SourceAdapter>> {
    let mut sources: Vec<Arc<dyn SourceAdapter>> = Vec::new();

    for view_id in &config.analytics.view_ids {
        sources.push(Arc::new(AnalyticsSource::new(
            config.analytics.clone(),
            view_id,
        )));
    }

    for owner in &config.travis.owners {
        sources.push(Arc::new(TravisSource::new(config.travis.clone(), owner)));
    }

    for owner in &config.circleci.owners {
        sources.push(Arc::new(CircleCiSource::new(config.circleci.clone(), owner)));
    }

    if !config.jenkins.base_uri.is_empty() {
        sources.push(Arc::new(JenkinsSource::new(config.jenkins.clone())));
    }

    let (enabled, disabled): (Vec<_>, Vec<_>) = sources.into_iter().partition(|s| s.enabled());
    for source in &disabled {
        tracing::warn!("skipping {}: required configuration missing", source.id());
    }

    enabled
}
