use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Barrier;
use std::thread;
use std::time::Duration;

use mask_wordcloud::cache::CorpusCache;

#[test]
fn one_fetch_per_url_in_flight() {
    let fetches = AtomicUsize::new(0);
    let cache = CorpusCache::new(|url: &str| {
        fetches.fetch_add(1, Ordering::SeqCst);
        thread::sleep(Duration::from_millis(50));
        Ok::<_, String>(format!("corpus from {url}"))
    });
    let barrier = Barrier::new(8);

    let results: Vec<_> = thread::scope(|s| {
        let handles: Vec<_> = (0..8)
            .map(|_| {
                s.spawn(|| {
                    barrier.wait();
                    cache.get("https://example.com/article").unwrap()
                })
            })
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });

    assert_eq!(fetches.load(Ordering::SeqCst), 1);
    assert!(results
        .iter()
        .all(|text| &**text == "corpus from https://example.com/article"));
}

#[test]
fn distinct_urls_fetch_independently() {
    let fetches = AtomicUsize::new(0);
    let cache = CorpusCache::new(|url: &str| {
        fetches.fetch_add(1, Ordering::SeqCst);
        Ok::<_, String>(url.to_uppercase())
    });

    thread::scope(|s| {
        for i in 0..4 {
            let cache = &cache;
            s.spawn(move || cache.get(&format!("https://site{i}.test")).unwrap());
        }
    });

    assert_eq!(fetches.load(Ordering::SeqCst), 4);
    assert!(cache.contains("https://site3.test"));
}
