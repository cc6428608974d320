// crates/sync-engine/src/site.rs
//! Application state: every synchronized collection plus device preferences

use crate::feature::FeatureSynchronizer;
use crate::gateway::MutationGateway;
use crate::seed::{LocalSeedMarker, SeedMarker};
use crate::store::{Direction, DocumentStore};
use crate::synchronizer::CollectionSynchronizer;
use octlib_core::defaults;
use octlib_core::{
    Book, ClosedDate, Document, Librarian, MonthlyFeature, NewsItem, Notice, SurveyQuestion,
};
use octlib_preferences::{IdSet, KeyValueStore};
use std::sync::Arc;

/// Field both dated feeds are ordered by, newest first
const DATE_FIELD: &str = "date";

/// How the site reaches its data
pub enum Connection {
    Connected(Arc<dyn DocumentStore>),
    /// No store could be configured; show built-in content read-only
    Unavailable,
}

impl Connection {
    pub fn is_connected(&self) -> bool {
        matches!(self, Connection::Connected(_))
    }
}

/// Startup options
#[derive(Clone)]
pub struct SiteOptions {
    /// Write default content into collections found empty
    pub seed_on_empty: bool,
    /// Where seeding is recorded; defaults to the preference store
    pub seed_marker: Option<Arc<dyn SeedMarker>>,
}

impl Default for SiteOptions {
    fn default() -> Self {
        Self {
            seed_on_empty: true,
            seed_marker: None,
        }
    }
}

/// A read-only copy of everything the site shows
#[derive(Debug, Clone, PartialEq)]
pub struct SiteView {
    pub books: Vec<Book>,
    pub news: Vec<NewsItem>,
    pub notices: Vec<Notice>,
    pub closed_dates: Vec<ClosedDate>,
    pub survey: Vec<SurveyQuestion>,
    pub feature: MonthlyFeature,
    pub librarians: Vec<Librarian>,
    pub reserved: Vec<String>,
    pub want_to_read: Vec<String>,
    pub connected: bool,
}

impl SiteView {
    pub fn book(&self, id: &str) -> Option<&Book> {
        self.books.iter().find(|book| book.id == id)
    }

    pub fn recommended_books(&self) -> Vec<&Book> {
        self.books.iter().filter(|book| book.is_recommended).collect()
    }

    pub fn new_books(&self) -> Vec<&Book> {
        self.books.iter().filter(|book| book.is_new).collect()
    }

    /// Books of the monthly feature, in feature order
    pub fn feature_books(&self) -> Vec<&Book> {
        self.feature.resolve_books(&self.books)
    }

    pub fn is_reserved(&self, id: &str) -> bool {
        self.reserved.iter().any(|r| r == id)
    }

    pub fn wants_to_read(&self, id: &str) -> bool {
        self.want_to_read.iter().any(|w| w == id)
    }
}

fn synchronizer<T: Document>(
    store: &Arc<dyn DocumentStore>,
    seed: Option<(&Arc<dyn SeedMarker>, Vec<T>)>,
) -> CollectionSynchronizer<T> {
    let sync = CollectionSynchronizer::new(store.clone());
    match seed {
        Some((marker, items)) => sync.with_seed(items, marker.clone()),
        None => sync,
    }
}

fn fallback<T: Document>(items: Vec<T>) -> CollectionSynchronizer<T> {
    let sync = CollectionSynchronizer::offline();
    sync.load_fallback(items);
    sync
}

/// Owns the synchronizers, the preference sets and the mutation gateway.
///
/// Created once by the composition root. Dropping it revokes every
/// subscription.
pub struct LibrarySite {
    books: CollectionSynchronizer<Book>,
    news: CollectionSynchronizer<NewsItem>,
    notices: CollectionSynchronizer<Notice>,
    closed_dates: CollectionSynchronizer<ClosedDate>,
    survey: CollectionSynchronizer<SurveyQuestion>,
    feature: FeatureSynchronizer,
    librarians: Vec<Librarian>,
    reserved: IdSet,
    want_to_read: IdSet,
    gateway: MutationGateway,
}

impl LibrarySite {
    /// Builds the site and, when connected, subscribes every collection
    pub fn start(
        connection: Connection,
        preferences: Arc<dyn KeyValueStore>,
        options: SiteOptions,
    ) -> Self {
        let reserved = IdSet::reserved(preferences.clone());
        let want_to_read = IdSet::want_to_read(preferences.clone());
        let librarians = defaults::initial_librarians();

        match connection {
            Connection::Connected(store) => {
                let marker: Option<Arc<dyn SeedMarker>> = options.seed_on_empty.then(|| {
                    options.seed_marker.clone().unwrap_or_else(|| {
                        Arc::new(LocalSeedMarker::new(preferences.clone())) as Arc<dyn SeedMarker>
                    })
                });
                let marker = marker.as_ref();

                let mut site = Self {
                    books: synchronizer(&store, marker.map(|m| (m, defaults::initial_books()))),
                    news: synchronizer(&store, marker.map(|m| (m, defaults::initial_news())))
                        .ordered_by(DATE_FIELD, Direction::Descending),
                    notices: synchronizer(&store, marker.map(|m| (m, defaults::initial_notices())))
                        .ordered_by(DATE_FIELD, Direction::Descending),
                    closed_dates: synchronizer(
                        &store,
                        marker.map(|m| (m, defaults::initial_closed_dates())),
                    ),
                    survey: synchronizer(&store, marker.map(|m| (m, defaults::initial_survey()))),
                    feature: FeatureSynchronizer::new(store.clone(), defaults::initial_feature()),
                    librarians,
                    reserved,
                    want_to_read,
                    gateway: MutationGateway::connected(store),
                };

                site.books.subscribe();
                site.news.subscribe();
                site.notices.subscribe();
                site.closed_dates.subscribe();
                site.survey.subscribe();
                site.feature.subscribe();
                log::info!("Library site started with a live store");
                site
            }
            Connection::Unavailable => {
                log::warn!("Store unavailable, showing built-in content");
                Self {
                    books: fallback(defaults::initial_books()),
                    news: fallback(defaults::initial_news()),
                    notices: fallback(defaults::initial_notices()),
                    closed_dates: fallback(defaults::initial_closed_dates()),
                    survey: fallback(defaults::initial_survey()),
                    feature: FeatureSynchronizer::offline(defaults::initial_feature()),
                    librarians,
                    reserved,
                    want_to_read,
                    gateway: MutationGateway::disconnected(),
                }
            }
        }
    }

    pub fn view(&self) -> SiteView {
        SiteView {
            books: self.books.items(),
            news: self.news.items(),
            notices: self.notices.items(),
            closed_dates: self.closed_dates.items(),
            survey: self.survey.items(),
            feature: self.feature.current(),
            librarians: self.librarians.clone(),
            reserved: self.reserved.ids().to_vec(),
            want_to_read: self.want_to_read.ids().to_vec(),
            connected: self.gateway.is_connected(),
        }
    }

    /// Reserves the book, or cancels the reservation. Returns whether it is
    /// reserved afterwards.
    pub fn toggle_reserve(&mut self, book_id: &str) -> bool {
        self.reserved.toggle(book_id)
    }

    /// Adds the book to the wish list, or removes it
    pub fn toggle_want_to_read(&mut self, book_id: &str) -> bool {
        self.want_to_read.toggle(book_id)
    }

    pub fn gateway(&self) -> &MutationGateway {
        &self.gateway
    }

    pub fn is_connected(&self) -> bool {
        self.gateway.is_connected()
    }

    /// Revokes every live subscription; the last state stays readable
    pub fn teardown(&mut self) {
        self.books.unsubscribe();
        self.news.unsubscribe();
        self.notices.unsubscribe();
        self.closed_dates.unsubscribe();
        self.survey.unsubscribe();
        self.feature.unsubscribe();
    }
}

impl Drop for LibrarySite {
    fn drop(&mut self) {
        self.teardown();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::seed::MemorySeedMarker;
    use crate::store::MemoryStore;
    use octlib_core::Collection;
    use octlib_preferences::MemoryKeyValueStore;

    #[test]
    fn test_unavailable_shows_defaults() {
        let site = LibrarySite::start(
            Connection::Unavailable,
            Arc::new(MemoryKeyValueStore::new()),
            SiteOptions::default(),
        );
        let view = site.view();

        assert!(!view.connected);
        assert_eq!(view.books.len(), 3);
        assert_eq!(view.notices[0].id, "nt1");
        assert_eq!(view.feature_books().len(), 2);
        assert_eq!(view.librarians.len(), 1);
    }

    #[test]
    fn test_cold_start_seeds_every_collection_once() {
        let store = MemoryStore::new();
        let marker = Arc::new(MemorySeedMarker::new());
        let options = SiteOptions {
            seed_on_empty: true,
            seed_marker: Some(marker.clone()),
        };

        let site = LibrarySite::start(
            Connection::Connected(Arc::new(store.clone())),
            Arc::new(MemoryKeyValueStore::new()),
            options,
        );

        // 3 books, 1 news, 2 notices, 2 dates, 1 question, 1 feature
        assert_eq!(store.write_count(), 10);
        let view = site.view();
        assert_eq!(view.books.len(), 3);
        assert_eq!(view.notices.len(), 2);
        assert_eq!(view.notices[0].date, "2024-05-20");
        assert_eq!(view.feature.title, "珈琲と本");
        for collection in Collection::ALL {
            if collection != Collection::Features {
                assert!(marker.is_seeded(collection.seed_marker_key()));
            }
        }
    }

    #[test]
    fn test_seeding_can_be_turned_off() {
        let store = MemoryStore::new();
        let site = LibrarySite::start(
            Connection::Connected(Arc::new(store.clone())),
            Arc::new(MemoryKeyValueStore::new()),
            SiteOptions {
                seed_on_empty: false,
                seed_marker: None,
            },
        );

        // only the feature singleton is written
        assert_eq!(store.write_count(), 1);
        assert!(site.view().books.is_empty());
    }

    #[test]
    fn test_teardown_revokes_all_subscriptions() {
        let store = MemoryStore::new();
        let mut site = LibrarySite::start(
            Connection::Connected(Arc::new(store.clone())),
            Arc::new(MemoryKeyValueStore::new()),
            SiteOptions::default(),
        );
        assert_eq!(store.subscription_count(), 6);
        site.teardown();
        assert_eq!(store.subscription_count(), 0);
    }
}
