//! Built-in classification of canonical type names into mutability-relevant
//! families (collections, atomics, caches, thread-locals, loggers).
//!
//! This is intentionally distinct from the externally supplied leaf-type
//! configuration consumed by the detector framework: these are structural
//! facts about the standard library and a handful of near-universal
//! third-party types, not project-specific category membership.

use std::collections::HashSet;
use std::sync::OnceLock;

fn mutable_collection_types() -> &'static HashSet<&'static str> {
    static SET: OnceLock<HashSet<&'static str>> = OnceLock::new();
    SET.get_or_init(|| {
        [
            "java.util.HashMap",
            "java.util.HashSet",
            "java.util.ArrayList",
            "java.util.LinkedList",
            "java.util.LinkedHashMap",
            "java.util.LinkedHashSet",
            "java.util.TreeMap",
            "java.util.TreeSet",
            "java.util.concurrent.ConcurrentHashMap",
            "java.util.concurrent.CopyOnWriteArrayList",
            "java.util.concurrent.CopyOnWriteArraySet",
            "java.util.concurrent.ConcurrentLinkedQueue",
            "java.util.concurrent.ConcurrentLinkedDeque",
            "java.util.concurrent.BlockingQueue",
            "java.util.concurrent.LinkedBlockingQueue",
            "java.util.concurrent.ArrayBlockingQueue",
        ]
        .into_iter()
        .collect()
    })
}

fn atomic_types() -> &'static HashSet<&'static str> {
    static SET: OnceLock<HashSet<&'static str>> = OnceLock::new();
    SET.get_or_init(|| {
        [
            "java.util.concurrent.atomic.AtomicInteger",
            "java.util.concurrent.atomic.AtomicLong",
            "java.util.concurrent.atomic.AtomicBoolean",
            "java.util.concurrent.atomic.AtomicReference",
        ]
        .into_iter()
        .collect()
    })
}

fn cache_types() -> &'static HashSet<&'static str> {
    static SET: OnceLock<HashSet<&'static str>> = OnceLock::new();
    SET.get_or_init(|| {
        [
            "com.google.common.cache.Cache",
            "com.google.common.cache.LoadingCache",
            "com.github.benmanes.caffeine.cache.Cache",
            "com.github.benmanes.caffeine.cache.LoadingCache",
            "net.sf.ehcache.Ehcache",
        ]
        .into_iter()
        .collect()
    })
}

fn thread_local_types() -> &'static HashSet<&'static str> {
    static SET: OnceLock<HashSet<&'static str>> = OnceLock::new();
    SET.get_or_init(|| {
        ["java.lang.ThreadLocal", "java.lang.InheritableThreadLocal"]
            .into_iter()
            .collect()
    })
}

fn logger_types() -> &'static HashSet<&'static str> {
    static SET: OnceLock<HashSet<&'static str>> = OnceLock::new();
    SET.get_or_init(|| {
        [
            "org.slf4j.Logger",
            "java.util.logging.Logger",
            "org.apache.logging.log4j.Logger",
            "ch.qos.logback.classic.Logger",
        ]
        .into_iter()
        .collect()
    })
}

pub fn is_mutable_collection(canonical_type: &str) -> bool {
    mutable_collection_types().contains(canonical_type)
}

pub fn is_atomic(canonical_type: &str) -> bool {
    atomic_types().contains(canonical_type)
}

pub fn is_cache(canonical_type: &str) -> bool {
    cache_types().contains(canonical_type)
}

pub fn is_thread_local(canonical_type: &str) -> bool {
    thread_local_types().contains(canonical_type)
}

pub fn is_logger(canonical_type: &str) -> bool {
    logger_types().contains(canonical_type)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recognizes_known_families() {
        assert!(is_mutable_collection("java.util.HashMap"));
        assert!(is_atomic("java.util.concurrent.atomic.AtomicInteger"));
        assert!(is_cache("com.google.common.cache.Cache"));
        assert!(is_thread_local("java.lang.ThreadLocal"));
        assert!(is_logger("org.slf4j.Logger"));
    }

    #[test]
    fn rejects_unrelated_types() {
        assert!(!is_mutable_collection("java.lang.String"));
        assert!(!is_logger("java.util.HashMap"));
    }
}
