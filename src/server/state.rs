//! Shared request state

use std::sync::Arc;

use crate::codec::NameCodec;
use crate::filter::IgnoreFilter;
use crate::settings::ConfigStore;
use crate::storage::PathResolver;

/// State shared by every request
pub struct AppState {
    pub resolver: PathResolver,
    pub settings: ConfigStore,
}

pub type SharedState = Arc<AppState>;

impl AppState {
    pub fn new(resolver: PathResolver, settings: ConfigStore) -> SharedState {
        Arc::new(Self { resolver, settings })
    }

    /// Codec and ignore rules from one settings snapshot
    pub fn snapshot(&self) -> (NameCodec, IgnoreFilter) {
        let settings = self.settings.get();
        let codec = NameCodec::from_settings(&settings);
        (codec, IgnoreFilter::new(settings.ignore_paths))
    }
}
