// SPDX-License-Identifier: MIT OR Apache-2.0

//! Helper utilities shared by the integration tests.

use k8scfg::domain::RawSource;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::layer::{Context, Layer, SubscriberExt};

/// Layer counting the WARN events emitted while it is installed.
#[allow(dead_code)]
#[derive(Clone, Default)]
pub struct WarnCounter {
    count: Arc<AtomicUsize>,
}

impl WarnCounter {
    /// Number of WARN events seen so far.
    #[allow(dead_code)]
    pub fn count(&self) -> usize {
        self.count.load(Ordering::SeqCst)
    }
}

impl<S: Subscriber> Layer<S> for WarnCounter {
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        if *event.metadata().level() == Level::WARN {
            self.count.fetch_add(1, Ordering::SeqCst);
        }
    }
}

/// Runs `f` with a subscriber counting WARN events and returns its result
/// with the number of warnings.
#[allow(dead_code)]
pub fn count_warnings<T>(f: impl FnOnce() -> T) -> (T, usize) {
    let counter = WarnCounter::default();
    let subscriber = tracing_subscriber::registry().with(counter.clone());
    let value = tracing::subscriber::with_default(subscriber, f);
    (value, counter.count())
}

/// Builds a source of namespace `default` from key/value pairs.
#[allow(dead_code)]
pub fn source(name: &str, data: &[(&str, &str)]) -> RawSource {
    RawSource::new(name, "default").with_data(data.iter().map(|(k, v)| (*k, *v)))
}

/// Turns string slices into owned names.
#[allow(dead_code)]
pub fn names(names: &[&str]) -> Vec<String> {
    names.iter().map(|n| n.to_string()).collect()
}
