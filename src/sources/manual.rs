use crate::model::{Application, ManualApp};
use crate::sources::Source;
use anyhow::Result;
use log::info;

/// Apps the user registered by hand, in registration order.
pub struct ManualSource<'a> {
    pub apps: &'a [ManualApp],
}

impl Source for ManualSource<'_> {
    fn scan(&self) -> Result<Vec<Application>> {
        let entries: Vec<Application> = self.apps.iter().map(Application::from).collect();
        info!("ManualSource: found {} entries", entries.len());
        Ok(entries)
    }
}
