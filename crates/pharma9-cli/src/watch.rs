use std::sync::Arc;
use std::time::Duration;

use pharma9_core::AppConfig;
use pharma9_session::{LocationWatch, LocatorSession, StdinLocationProvider, WatchOptions};
use pharma9_store::RatingPersistence;

use crate::list::print_table;

pub(crate) fn watch_options(config: &AppConfig) -> WatchOptions {
    WatchOptions {
        high_accuracy: config.location_high_accuracy,
        timeout: Duration::from_millis(config.location_timeout_ms),
        maximum_age: Duration::from_millis(config.location_max_age_ms),
    }
}

fn print_top<S: RatingPersistence>(session: &LocatorSession<S>, limit: usize) {
    let results = session.results();
    let shown = &results[..results.len().min(limit)];
    if let Some(origin) = session.view().origin {
        println!("\norigin {origin}");
    }
    print_table(shown, session.view().origin);
}

/// Follow positions from stdin, re-ranking once per push until input ends,
/// the watch fails, or ctrl-c.
pub(crate) async fn run_watch<S: RatingPersistence>(
    session: &mut LocatorSession<S>,
    config: &AppConfig,
    limit: usize,
) {
    let provider = Arc::new(StdinLocationProvider::new());
    let mut watch = LocationWatch::start(provider, watch_options(config), config.default_origin);
    let mut origin = watch.subscribe();

    session.set_watching(watch.is_active());
    session.set_origin(Some(watch.latest()));
    print_top(session, limit);

    let mut notices_open = true;
    loop {
        tokio::select! {
            changed = origin.changed() => {
                if changed.is_err() {
                    break;
                }
                let latest = *origin.borrow_and_update();
                session.set_origin(Some(latest));
                print_top(session, limit);
            }
            notice = watch.next_notice(), if notices_open => match notice {
                Some(notice) => eprintln!("{notice}"),
                None => notices_open = false,
            },
            _ = tokio::signal::ctrl_c() => break,
        }
    }

    watch.stop();
    while let Some(notice) = watch.try_next_notice() {
        eprintln!("{notice}");
    }
    session.set_watching(false);
    tracing::debug!("location watch ended");
}
