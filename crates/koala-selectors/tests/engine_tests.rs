//! Integration tests for the query engine, its configuration, and the
//! compiled-selector cache.

use std::sync::Arc;
use std::thread;

use koala_dom::TreeBuilder;
use koala_selectors::{
    CacheStats, DEFAULT_CACHE_CAPACITY, EngineConfig, QueryEngine, SelectorCache, SelectorError,
};

// Configuration

#[test]
fn test_default_config() {
    let engine = QueryEngine::new();
    assert_eq!(engine.cache().capacity(), Some(DEFAULT_CACHE_CAPACITY));
    assert_eq!(EngineConfig::default().cache_capacity, Some(1024));
}

#[test]
fn test_config_from_json() {
    let config: EngineConfig = serde_json::from_str(r#"{"cache_capacity": 8}"#).unwrap();
    assert_eq!(config.cache_capacity, Some(8));
    assert_eq!(QueryEngine::with_config(&config).cache().capacity(), Some(8));

    let unbounded: EngineConfig = serde_json::from_str(r#"{"cache_capacity": null}"#).unwrap();
    assert_eq!(unbounded.cache_capacity, None);

    let defaulted: EngineConfig = serde_json::from_str("{}").unwrap();
    assert_eq!(defaulted, EngineConfig::default());
}

#[test]
fn test_config_rejects_unknown_fields() {
    assert!(serde_json::from_str::<EngineConfig>(r#"{"cache_size": 8}"#).is_err());
}

// Cache behaviour

#[test]
fn test_hits_and_misses() {
    let cache = SelectorCache::new(Some(4));
    let first = cache.get_or_compile("div > p").unwrap();
    let second = cache.get_or_compile("div > p").unwrap();

    assert!(Arc::ptr_eq(&first, &second));
    assert_eq!(
        cache.stats(),
        CacheStats {
            hits: 1,
            misses: 1,
            evictions: 0,
            len: 1,
        }
    );
}

#[test]
fn test_cache_keys_on_exact_text() {
    let cache = SelectorCache::new(None);
    let _ = cache.get_or_compile("div>p").unwrap();
    let _ = cache.get_or_compile("div > p").unwrap();

    assert_eq!(cache.len(), 2);
    assert!(cache.contains("div>p"));
    assert!(!cache.contains("div  >  p"));
    assert_eq!(cache.stats().misses, 2);
}

#[test]
fn test_failed_compiles_are_not_cached() {
    let cache = SelectorCache::new(None);
    assert!(cache.get_or_compile("div >").is_err());
    assert!(cache.get_or_compile("div >").is_err());

    assert!(cache.is_empty());
    assert_eq!(cache.stats().misses, 2);
    assert!(cache.get("div >").is_none());
}

#[test]
fn test_fifo_eviction() {
    let cache = SelectorCache::new(Some(2));
    for text in ["a", "b", "c"] {
        let _ = cache.get_or_compile(text).unwrap();
    }

    assert_eq!(cache.len(), 2);
    assert!(!cache.contains("a"));
    assert!(cache.contains("b"));
    assert!(cache.contains("c"));
    assert_eq!(cache.stats().evictions, 1);

    // A hit does not refresh an entry's place in line.
    let _ = cache.get_or_compile("b").unwrap();
    let _ = cache.get_or_compile("d").unwrap();
    assert!(!cache.contains("b"));
    assert!(cache.contains("c"));
    assert!(cache.contains("d"));
}

#[test]
fn test_zero_capacity_never_stores() {
    let engine = QueryEngine::with_config(&EngineConfig {
        cache_capacity: Some(0),
    });
    let first = engine.compile("p").unwrap();
    let second = engine.compile("p").unwrap();

    assert!(!Arc::ptr_eq(&first, &second));
    assert!(engine.cache().is_empty());
    assert_eq!(engine.cache().stats().misses, 2);
    assert_eq!(engine.cache().stats().evictions, 0);
}

#[test]
fn test_unbounded_cache_never_evicts() {
    let cache = SelectorCache::new(None);
    for i in 0..100 {
        let _ = cache.get_or_compile(&format!(".c{i}")).unwrap();
    }
    assert_eq!(cache.len(), 100);
    assert_eq!(cache.stats().evictions, 0);
}

#[test]
fn test_clear_resets_entries_and_counters() {
    let cache = SelectorCache::default();
    let kept = cache.get_or_compile("li").unwrap();
    let _ = cache.get_or_compile("li").unwrap();

    cache.clear();
    assert!(cache.is_empty());
    assert_eq!(cache.stats(), CacheStats::default());

    // Handed-out selectors outlive the entry.
    assert_eq!(kept.text, "li");
    let recompiled = cache.get_or_compile("li").unwrap();
    assert!(!Arc::ptr_eq(&kept, &recompiled));
    assert_eq!(kept.group, recompiled.group);
}

#[test]
fn test_get_does_not_touch_counters() {
    let cache = SelectorCache::new(None);
    assert!(cache.get("p").is_none());
    let _ = cache.get_or_compile("p").unwrap();
    assert!(cache.get("p").is_some());
    assert_eq!(cache.stats().hits, 0);
    assert_eq!(cache.stats().misses, 1);
}

#[test]
fn test_concurrent_compiles_share_one_entry() {
    let cache = Arc::new(SelectorCache::new(None));
    let handles: Vec<_> = (0..8)
        .map(|_| {
            let cache = Arc::clone(&cache);
            thread::spawn(move || cache.get_or_compile("ul > li:nth-child(odd)").unwrap())
        })
        .collect();

    let compiled: Vec<_> = handles
        .into_iter()
        .map(|handle| handle.join().unwrap())
        .collect();

    assert_eq!(cache.len(), 1);
    let stored = cache.get("ul > li:nth-child(odd)").unwrap();
    assert!(compiled.iter().all(|c| Arc::ptr_eq(c, &stored)));
    assert_eq!(cache.stats().hits + cache.stats().misses, 8);
}

// Engine

#[test]
fn test_engine_compile_reports_syntax_errors() {
    let engine = QueryEngine::new();
    let Err(SelectorError::Syntax(error)) = engine.compile("a[") else {
        panic!("expected a syntax error");
    };
    assert_eq!(error.position, 2);
}

#[test]
fn test_repeated_queries_hit_the_cache() {
    let mut builder = TreeBuilder::new();
    let _ = builder.open("ul", &[]);
    let li = builder.leaf("li", &[]);
    let tree = builder.finish();

    let engine = QueryEngine::new();
    for _ in 0..3 {
        assert_eq!(
            engine.query_selector_all(&tree, tree.root(), "ul li").unwrap(),
            vec![li]
        );
    }
    assert!(engine.matches(&tree, li, "ul li").unwrap());
    assert_eq!(engine.closest(&tree, li, "ul li").unwrap(), Some(li));

    let stats = engine.cache().stats();
    assert_eq!(stats.misses, 1);
    assert_eq!(stats.hits, 4);
}

#[test]
fn test_compiled_selector_is_reusable_across_trees() {
    let engine = QueryEngine::new();
    let compiled = engine.compile("p.x").unwrap();

    let mut first = TreeBuilder::new();
    let a = first.leaf("p", &[("class", "x")]);
    let first = first.finish();

    let mut second = TreeBuilder::new();
    let _ = second.leaf("p", &[]);
    let b = second.leaf("p", &[("class", "x y")]);
    let second = second.finish();

    assert_eq!(compiled.select(&first, first.root()).unwrap(), vec![a]);
    assert_eq!(compiled.select(&second, second.root()).unwrap(), vec![b]);
    assert!(compiled.matches(&second, b).unwrap());
}
