use tracing::info;

use crate::aggregate::{PaperRecord, aggregate_all};
use crate::config::Config;
use crate::error::Result;
use crate::fetcher::fetch_assigned_papers;
use crate::platform::ReviewPlatform;
use crate::profiles::{AnyProfile, ConferenceProfile};
use crate::sheet::{SheetLayout, SheetStore, SyncMode, SyncReport, sync};

/// One run: fetch assigned papers, aggregate them, write them to a sheet.
pub struct Pipeline<P: ReviewPlatform> {
    platform: P,
    profile: AnyProfile,
    config: Config,
}

impl<P: ReviewPlatform> Pipeline<P> {
    pub fn new(platform: P, profile: AnyProfile, config: Config) -> Self {
        Self {
            platform,
            profile,
            config,
        }
    }

    pub fn layout(&self) -> SheetLayout {
        SheetLayout::new(self.config.reviewer_slots)
    }

    pub fn mode(&self) -> SyncMode {
        if self.config.initialize {
            SyncMode::Initialize
        } else {
            SyncMode::Update
        }
    }

    /// Fetch and aggregate without touching any sheet.
    pub fn collect(&self) -> Result<Vec<PaperRecord>> {
        info!(conference = self.profile.name(), "collecting assigned papers");
        let papers = fetch_assigned_papers(&self.platform, &self.profile, self.config.page_size)?;
        let records = aggregate_all(&papers, &self.profile);
        info!(count = records.len(), "aggregated paper records");
        Ok(records)
    }

    /// Collect, then sync into `store`. Nothing is written if collection fails.
    pub fn run<S: SheetStore + ?Sized>(&self, store: &mut S) -> Result<SyncReport> {
        let records = self.collect()?;
        let mode = self.mode();
        info!(?mode, records = records.len(), "syncing sheet");
        let report = sync(store, &self.layout(), &records, mode)?;
        info!(
            updated = report.updated,
            appended = report.appended,
            "sync complete"
        );
        Ok(report)
    }
}
