//! # Integration Tests
//!
//! 集成测试与端到端测试。
//!
//! 负责：
//! - 合约快照测试 (配置模式与序列化格式)
//! - 请求 → 应答 → 缓存 → 快照 e2e 测试
//! - 通知 → 分发循环 → 缓存 e2e 测试

#[cfg(test)]
mod contract_tests {
    use contracts::{AttributeKey, ServiceConfig, Snapshot};
    use serde_json::Value;

    /// The enumerated schema must list exactly the serialized fields
    #[test]
    fn test_schema_matches_serialized_config() {
        let mut config = ServiceConfig::default();
        config.telemetry.metrics_port = Some(9000);
        let json = config_loader::ConfigLoader::to_json(&config).unwrap();
        let value: Value = serde_json::from_str(&json).unwrap();
        let root = value.as_object().unwrap();

        assert_eq!(root.len(), ServiceConfig::SCHEMA.len());
        for (section, keys) in ServiceConfig::SCHEMA {
            let mut serialized: Vec<&str> = root[*section]
                .as_object()
                .unwrap()
                .keys()
                .map(String::as_str)
                .collect();
            let mut expected = keys.to_vec();
            serialized.sort_unstable();
            expected.sort_unstable();
            assert_eq!(serialized, expected, "section [{section}]");
        }
    }

    #[test]
    fn test_snapshot_json_shape() {
        let snapshot = Snapshot::stamped(1_000).with(AttributeKey::Speed, 12.5);
        assert_eq!(
            serde_json::to_string(&snapshot).unwrap(),
            r#"{"timestamp_ms":1000,"values":{"speed":12.5}}"#
        );
    }
}

#[cfg(test)]
mod e2e_tests {
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;
    use std::thread;
    use std::time::{Duration, Instant};

    use attribute_cache::{AttributeCache, QueryFacade};
    use bytes::Bytes;
    use config_loader::{ConfigFormat, ConfigLoader};
    use contracts::{AttributeKey, AttributeMask, SnapshotProvider, Snapshot};
    use dispatcher::{channel_bus, DispatchLoop, StopOutcome};
    use wire_codec::{decode_reply, decode_request, encode_reply, encode_request, encode_update};

    const CONFIG: &str = r#"
[dispatch]
receive_timeout_ms = 10
stop_timeout_ms = 1000
channel_capacity = 32
"#;

    fn wait_until(mut condition: impl FnMut() -> bool) -> bool {
        let deadline = Instant::now() + Duration::from_secs(3);
        while Instant::now() < deadline {
            if condition() {
                return true;
            }
            thread::sleep(Duration::from_millis(5));
        }
        false
    }

    /// Service side of the request/reply exchange
    fn answer(request: &[u8]) -> Bytes {
        let position = Snapshot::new()
            .with(AttributeKey::Latitude, 47.31608607)
            .with(AttributeKey::Longitude, 6.23329262)
            .with(AttributeKey::Altitude, 337.0)
            .with(AttributeKey::Speed, 4.0);
        let keys = decode_request(request).unwrap();
        encode_reply(&position.restricted_to(keys))
    }

    /// End-to-end test: request {lat, lon, alt} -> reply -> cache -> snapshot_all
    #[test]
    fn test_e2e_compliance_request_reply() {
        let mask: AttributeMask = [
            AttributeKey::Latitude,
            AttributeKey::Longitude,
            AttributeKey::Altitude,
        ]
        .into_iter()
        .collect();

        let reply = answer(&encode_request(mask));
        let decoded = decode_reply(&reply).unwrap();
        assert_eq!(decoded.mask(), mask);

        let cache = Arc::new(AttributeCache::new());
        cache.apply(&decoded);
        let provider: Box<dyn SnapshotProvider> = Box::new(QueryFacade::new(cache));
        let snapshot = provider.snapshot_all();

        assert_eq!(snapshot.get(AttributeKey::Latitude), Some(47.31608607));
        assert_eq!(snapshot.get(AttributeKey::Longitude), Some(6.23329262));
        assert_eq!(snapshot.get(AttributeKey::Altitude), Some(337.0));
        // not requested, still at its default
        assert_eq!(snapshot.get(AttributeKey::Speed), Some(0.0));
        assert!(snapshot.timestamp_ms.is_some());
    }

    /// End-to-end test: notifications -> DispatchLoop -> cache -> QueryFacade
    #[test]
    fn test_e2e_dispatch_updates() {
        let config = ConfigLoader::load_from_str(CONFIG, ConfigFormat::Toml).unwrap();
        let cache = Arc::new(AttributeCache::new());
        let facade = QueryFacade::new(Arc::clone(&cache));

        let (publisher, mut connector) = channel_bus("e2e", config.dispatch.channel_capacity);
        let mut dispatch = DispatchLoop::new("e2e", config.dispatch.clone(), Arc::clone(&cache));
        dispatch.connect(&mut connector).unwrap();
        dispatch.listen().unwrap();

        let first = Snapshot::new()
            .with(AttributeKey::Latitude, 47.0)
            .with(AttributeKey::Longitude, 6.0);
        publisher
            .publish(encode_update(first.mask(), &first))
            .unwrap();
        // longitude in the payload but not flagged
        publisher
            .publish(encode_update(AttributeKey::Latitude.into(), &first))
            .unwrap();
        let second = Snapshot::new().with(AttributeKey::Speed, 13.9);
        publisher
            .publish(encode_update(
                AttributeMask::from(AttributeKey::Speed) | AttributeKey::Altitude,
                &second,
            ))
            .unwrap();

        let metrics = Arc::clone(dispatch.metrics());
        assert!(wait_until(|| metrics.received() == 3));
        assert_eq!(metrics.applied(), 2);
        assert_eq!(metrics.decode_failures(), 1);
        assert_eq!(metrics.values_written(), 3);

        let snapshot = facade.snapshot_all();
        assert_eq!(snapshot.get(AttributeKey::Latitude), Some(47.0));
        assert_eq!(snapshot.get(AttributeKey::Longitude), Some(6.0));
        assert_eq!(snapshot.get(AttributeKey::Altitude), Some(0.0));
        assert_eq!(snapshot.get(AttributeKey::Speed), Some(13.9));

        assert_eq!(dispatch.stop().unwrap(), StopOutcome::Completed);
        let writes = cache.write_count();
        assert!(publisher.publish(encode_update(first.mask(), &first)).is_err());
        thread::sleep(Duration::from_millis(50));
        assert_eq!(cache.write_count(), writes);
    }

    /// Readers polling during dispatch only ever see published values
    #[test]
    fn test_e2e_concurrent_readers() {
        let config = ConfigLoader::load_from_str(CONFIG, ConfigFormat::Toml).unwrap();
        let cache = Arc::new(AttributeCache::new());
        let (publisher, mut connector) = channel_bus("readers", config.dispatch.channel_capacity);
        let mut dispatch = DispatchLoop::new("readers", config.dispatch, Arc::clone(&cache));
        dispatch.connect(&mut connector).unwrap();
        dispatch.listen().unwrap();

        let done = Arc::new(AtomicBool::new(false));
        let readers: Vec<_> = (0..4)
            .map(|_| {
                let facade = QueryFacade::new(Arc::clone(&cache));
                let done = Arc::clone(&done);
                thread::spawn(move || {
                    while !done.load(Ordering::Acquire) {
                        let snapshot = facade.snapshot_all();
                        let latitude = snapshot.get(AttributeKey::Latitude).unwrap_or(-1.0);
                        // 0.0 before the first write, then whole degrees only
                        assert!(latitude.fract() == 0.0 && (0.0..=50.0).contains(&latitude));
                    }
                })
            })
            .collect();

        for degree in 1..=50 {
            let snapshot = Snapshot::new()
                .with(AttributeKey::Latitude, f64::from(degree))
                .with(AttributeKey::Speed, f64::from(degree));
            publisher
                .publish(encode_update(snapshot.mask(), &snapshot))
                .unwrap();
        }

        let metrics = Arc::clone(dispatch.metrics());
        assert!(wait_until(|| metrics.applied() == 50));
        done.store(true, Ordering::Release);
        for reader in readers {
            reader.join().unwrap();
        }

        assert_eq!(cache.get(AttributeKey::Latitude), 50.0);
        assert_eq!(dispatch.stop().unwrap(), StopOutcome::Completed);
    }
}
