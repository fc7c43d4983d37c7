//! Mapping table properties.

use overridehosts::dns::MappingTable;
use proptest::prelude::*;

use std::sync::{Barrier, LazyLock};

fn host() -> impl Strategy<Value = String> {
    "[a-zA-Z][a-zA-Z0-9.-]{0,20}"
}

fn ip() -> impl Strategy<Value = (String, String)> {
    prop_oneof![
        any::<[u8; 4]>().prop_map(|o| {
            let ip = std::net::Ipv4Addr::from(o).to_string();
            (ip.clone(), ip)
        }),
        any::<[u8; 16]>().prop_map(|o| {
            let ip = std::net::Ipv6Addr::from(o).to_string();
            (format!("[{ip}]"), ip)
        }),
    ]
}

fn separator() -> impl Strategy<Value = &'static str> {
    prop_oneof![Just(","), Just(" "), Just(", "), Just("\t"), Just(" ,\n")]
}

proptest! {
    #[test]
    fn prop_valid_items_round_trip(
        items in proptest::collection::vec((host(), ip(), separator()), 1..16)
    ) {
        let mut raw = String::new();
        for (host, (written, _), sep) in &items {
            raw.push_str(host);
            raw.push(':');
            raw.push_str(written);
            raw.push_str(sep);
        }

        let table = MappingTable::parse(&raw);

        // Last occurrence of each lowercased host wins.
        let mut expected = std::collections::HashMap::new();
        for (host, (_, bare), _) in &items {
            expected.insert(host.to_ascii_lowercase(), bare.clone());
        }
        prop_assert_eq!(table.len(), expected.len());
        for (host, bare) in &expected {
            prop_assert_eq!(table.lookup(host), Some(bare.as_str()));
            prop_assert_eq!(table.lookup(&host.to_ascii_uppercase()), Some(bare.as_str()));
        }
    }

    #[test]
    fn prop_parse_never_panics(raw in "\\PC{0,200}") {
        let table = MappingTable::parse(&raw);
        for (host, ip) in table.iter() {
            prop_assert!(!host.is_empty());
            prop_assert!(!ip.is_empty());
            prop_assert_eq!(host.to_ascii_lowercase(), host);
        }
    }

    #[test]
    fn prop_items_without_colon_ignored(words in proptest::collection::vec("[a-z0-9.]{1,12}", 0..10)) {
        let table = MappingTable::parse(&words.join(","));
        prop_assert!(table.is_empty());
    }
}

#[test]
fn test_concurrent_first_use_sees_full_table() {
    const ENTRIES: usize = 2000;
    const THREADS: usize = 16;

    static TABLE: LazyLock<MappingTable> = LazyLock::new(|| {
        let raw: Vec<String> = (0..ENTRIES)
            .map(|i| format!("host{i}:10.{}.{}.{}", i / 65536, (i / 256) % 256, i % 256))
            .collect();
        MappingTable::parse(&raw.join(","))
    });

    let barrier = Barrier::new(THREADS);
    std::thread::scope(|s| {
        for _ in 0..THREADS {
            s.spawn(|| {
                barrier.wait();
                let table = &*TABLE;
                assert_eq!(table.len(), ENTRIES);
                assert_eq!(table.lookup("HOST1999"), Some("10.0.7.207"));
            });
        }
    });
}
