use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use crate::error::Result;
use crate::models::Event;
use crate::scraping::ScheduleSource;

pub const FRESHNESS_WINDOW: Duration = Duration::from_secs(60 * 60);

/// Events from exactly one extraction pass, stamped with when it finished.
#[derive(Debug)]
pub struct Snapshot {
    pub events: Vec<Event>,
    pub refreshed_at: Instant,
}

impl Snapshot {
    pub fn find(&self, id: &str) -> Option<&Event> {
        self.events.iter().find(|event| event.id == id)
    }
}

/// Time-bounded memo around a [`ScheduleSource`].
///
/// Snapshots are replaced whole, so a reader holding one never sees a
/// refresh in progress. Concurrent callers that both find the cache stale
/// both extract; the last one to finish wins.
pub struct ScheduleCache {
    source: Box<dyn ScheduleSource>,
    window: Duration,
    current: Mutex<Option<Arc<Snapshot>>>,
}

impl ScheduleCache {
    pub fn new<S: ScheduleSource + 'static>(source: S, window: Duration) -> Self {
        Self {
            source: Box::new(source),
            window,
            current: Mutex::new(None),
        }
    }

    pub fn get(&self) -> Result<Arc<Snapshot>> {
        if let Some(snapshot) = self.fresh() {
            tracing::debug!(events = snapshot.events.len(), "schedule cache hit");
            return Ok(snapshot);
        }

        let events = self.source.fetch()?;
        let snapshot = Arc::new(Snapshot {
            events,
            refreshed_at: Instant::now(),
        });
        *self.current.lock().expect("schedule cache mutex poisoned") = Some(snapshot.clone());
        Ok(snapshot)
    }

    /// Linear scan of the current (possibly just refreshed) events.
    pub fn lookup(&self, id: &str) -> Result<Option<Event>> {
        Ok(self.get()?.find(id).cloned())
    }

    pub fn refreshed_at(&self) -> Option<Instant> {
        self.current
            .lock()
            .expect("schedule cache mutex poisoned")
            .as_ref()
            .map(|snapshot| snapshot.refreshed_at)
    }

    fn fresh(&self) -> Option<Arc<Snapshot>> {
        let guard = self.current.lock().expect("schedule cache mutex poisoned");
        guard
            .as_ref()
            .filter(|snapshot| {
                !snapshot.events.is_empty() && snapshot.refreshed_at.elapsed() <= self.window
            })
            .cloned()
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;
    use crate::error::ScheduleError;
    use crate::scraping::proms_html;

    /// Serves the sample listing and counts how often it was asked to.
    #[derive(Clone, Default)]
    pub(crate) struct CountingSource {
        pub(crate) calls: Arc<AtomicUsize>,
        pub(crate) html: Option<&'static str>,
        pub(crate) delay: Option<Duration>,
    }

    impl ScheduleSource for CountingSource {
        fn fetch(&self) -> Result<Vec<Event>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if let Some(delay) = self.delay {
                std::thread::sleep(delay);
            }
            let html = self.html.unwrap_or(proms_html::tests::SAMPLE_HTML);
            Ok(proms_html::parse_document(html)?.events)
        }
    }

    struct FailingSource;

    impl ScheduleSource for FailingSource {
        fn fetch(&self) -> Result<Vec<Event>> {
            Err(ScheduleError::DayHeading("broken".to_string()))
        }
    }

    #[test]
    fn reuses_snapshot_within_window() {
        let source = CountingSource::default();
        let calls = source.calls.clone();
        let cache = ScheduleCache::new(source, FRESHNESS_WINDOW);

        let first = cache.get().expect("first get");
        let stamp = cache.refreshed_at();
        let second = cache.get().expect("second get");

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(first.events, second.events);
        assert_eq!(cache.refreshed_at(), stamp);
    }

    #[test]
    fn refreshes_after_window() {
        let source = CountingSource::default();
        let calls = source.calls.clone();
        let cache = ScheduleCache::new(source, Duration::from_millis(10));

        cache.get().expect("first get");
        std::thread::sleep(Duration::from_millis(30));
        cache.get().expect("second get");

        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn empty_collection_is_never_fresh() {
        let source = CountingSource {
            html: Some("<html></html>"),
            ..CountingSource::default()
        };
        let calls = source.calls.clone();
        let cache = ScheduleCache::new(source, FRESHNESS_WINDOW);

        assert!(cache.get().expect("first get").events.is_empty());
        cache.get().expect("second get");
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn failed_pass_stores_nothing() {
        let cache = ScheduleCache::new(FailingSource, FRESHNESS_WINDOW);
        assert!(cache.get().is_err());
        assert!(cache.refreshed_at().is_none());
    }

    #[test]
    fn concurrent_stale_readers_see_whole_snapshots() {
        const READERS: usize = 8;
        let source = CountingSource {
            delay: Some(Duration::from_millis(20)),
            ..CountingSource::default()
        };
        let calls = source.calls.clone();
        let cache = Arc::new(ScheduleCache::new(source, FRESHNESS_WINDOW));

        let handles: Vec<_> = (0..READERS)
            .map(|_| {
                let cache = cache.clone();
                std::thread::spawn(move || cache.get().expect("get"))
            })
            .collect();
        let snapshots: Vec<Arc<Snapshot>> = handles
            .into_iter()
            .map(|handle| handle.join().expect("reader thread"))
            .collect();

        let expected = proms_html::parse_document(proms_html::tests::SAMPLE_HTML)
            .expect("parse")
            .events;
        for snapshot in &snapshots {
            assert_eq!(snapshot.events, expected);
        }

        let calls = calls.load(Ordering::SeqCst);
        assert!((1..=READERS).contains(&calls), "{calls} extractions");

        let stored = cache.refreshed_at().expect("stored snapshot");
        assert!(snapshots
            .iter()
            .any(|snapshot| snapshot.refreshed_at == stored));
    }

    #[test]
    fn lookup_by_id() {
        let cache = ScheduleCache::new(CountingSource::default(), FRESHNESS_WINDOW);

        let found = cache.lookup("planets").expect("lookup");
        assert_eq!(found.map(|e| e.name), Some("The Planets".to_string()));

        let stamp = cache.refreshed_at();
        assert!(cache.lookup("no-such-prom").expect("lookup").is_none());
        assert_eq!(cache.refreshed_at(), stamp);
    }
}
