use crate::config::AppConfig;
use crate::error::Result;
use crate::model::language::LanguageCatalog;
use crate::services::fetch::{HttpFetcher, RemoteFetcher};
use crate::services::languages::{CatalogLanguageValidator, LanguagePairValidator};
use crate::services::pairing::{AlignedPairValidator, FilePairValidator};
use crate::services::sentences::{self, SentenceCounter};
use crate::services::store::Store;

/// Everything a request handler needs: configuration, storage and the
/// validation collaborators.
pub struct App {
    pub config: AppConfig,
    pub store: Store,
    pub catalog: LanguageCatalog,
    pub fetcher: Box<dyn RemoteFetcher>,
    pub counter: Box<dyn SentenceCounter>,
    pub languages: Box<dyn LanguagePairValidator>,
    pub pairing: Box<dyn FilePairValidator>,
}

impl App {
    pub fn new(config: AppConfig) -> Result<Self> {
        let store = Store::open(&config.data_dir)?;
        let catalog = LanguageCatalog::load(&config.languages_file())?;
        let fetcher = HttpFetcher::new(config.http_timeout, config.download_chunk_size)?;

        Ok(Self {
            counter: sentences::counter_for(config.sentence_mode),
            languages: Box::new(CatalogLanguageValidator::new(catalog.clone())),
            pairing: Box::new(AlignedPairValidator),
            fetcher: Box::new(fetcher),
            catalog,
            store,
            config,
        })
    }

    pub fn with_fetcher(mut self, fetcher: Box<dyn RemoteFetcher>) -> Self {
        self.fetcher = fetcher;
        self
    }

    pub fn with_counter(mut self, counter: Box<dyn SentenceCounter>) -> Self {
        self.counter = counter;
        self
    }

    pub fn with_languages(mut self, languages: Box<dyn LanguagePairValidator>) -> Self {
        self.languages = languages;
        self
    }
}
