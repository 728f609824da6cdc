#[cfg(test)]
mod telemetry_tests {
    use std::time::Duration;

    use std::sync::Arc;

    use bytes::Bytes;

    use blockpress_core::compression::{
        BlockCompressor, BlockOutcome, CodecCapabilities, CodecChoice, CodecInfo, CodecParams,
        CompressedBlock, CompressionBackend, CompressionOptions, CompressionType,
    };
    use blockpress_core::types::{CompressionError, Result};
    use blockpress_core::telemetry::{Stage, StageTimes, TelemetryCounters, TelemetrySnapshot, TelemetryTimer};

    fn block(outcome: BlockOutcome, stored: usize, raw: usize) -> CompressedBlock {
        CompressedBlock {
            index: 0,
            data: Bytes::from(vec![0u8; stored]),
            compression_type: if outcome == BlockOutcome::Compressed {
                CompressionType::ZSTD
            } else {
                CompressionType::NONE
            },
            raw_len: raw,
            dictionary_id: None,
            outcome,
        }
    }

    fn make_counters() -> TelemetryCounters {
        let mut c = TelemetryCounters::default();
        for _ in 0..4 {
            c.add_submitted(1_000);
        }
        c.add_block(&block(BlockOutcome::Compressed, 200, 1_000));
        c.add_block(&block(BlockOutcome::Compressed, 300, 1_000));
        c.add_block(&block(BlockOutcome::RatioRejected, 1_000, 1_000));
        c.add_block(&block(BlockOutcome::NotRequested, 500, 1_000));
        c
    }

    #[test]
    fn counters_classify_outcomes() {
        let c = make_counters();
        assert_eq!(c.blocks_submitted, 4);
        assert_eq!(c.blocks_compressed, 2);
        assert_eq!(c.blocks_rejected, 1);
        assert_eq!(c.blocks_uncompressed, 1);
        assert_eq!(c.blocks_failed, 0);
        assert_eq!(c.blocks_emitted(), 4);
        assert_eq!(c.bytes_raw, 4_000);
        assert_eq!(c.bytes_stored, 2_000);

        let mut failed = TelemetryCounters::default();
        failed.add_block(&block(BlockOutcome::BackendFailed, 10, 10));
        failed.add_block(&block(BlockOutcome::ContractViolation, 10, 10));
        assert_eq!(failed.blocks_failed, 2);
    }

    struct Broken;

    impl CompressionBackend for Broken {
        fn info(&self) -> CodecInfo {
            CodecInfo { name: "broken", capabilities: CodecCapabilities::empty(), default_level: None }
        }
        fn compress(&self, _raw: &[u8], _p: &CodecParams<'_>) -> Result<Vec<u8>> {
            Err(CompressionError::codec("broken", "always fails"))
        }
        fn decompress(&self, _c: &[u8], _d: Option<&[u8]>) -> Result<Vec<u8>> {
            Err(CompressionError::corruption("broken", "always fails"))
        }
    }

    #[test]
    fn backend_errors_count_by_path() {
        let compressor = BlockCompressor::new(Arc::new(CompressionOptions::default()));
        let choice = CodecChoice { ctype: CompressionType::from_u8(0x90), backend: Some(Arc::new(Broken)) };
        let raw = Bytes::from_static(b"payload that the backend never compresses");

        let mut c = TelemetryCounters::default();
        c.add_block(&compressor.compress(0, raw.clone(), &choice, None));
        assert_eq!((c.blocks_rejected, c.blocks_failed), (1, 0));

        c.add_block(&compressor.compress_unbounded(1, raw, &choice, None));
        assert_eq!((c.blocks_rejected, c.blocks_failed), (1, 1));
    }

    #[test]
    fn counters_merge() {
        let mut a = make_counters();
        a.add_sampled(100);
        a.add_denial();
        let mut b = make_counters();
        b.set_dictionary(64);
        a.merge(&b);
        assert_eq!(a.blocks_submitted, 8);
        assert_eq!(a.bytes_stored, 4_000);
        assert_eq!(a.bytes_sampled, 100);
        assert_eq!(a.bytes_dictionary, 64);
        assert_eq!(a.charge_denials, 1);
    }

    #[test]
    fn stage_times_accumulate() {
        let mut t = StageTimes::default();
        t.add(Stage::Compress, Duration::from_millis(3));
        t.add(Stage::Compress, Duration::from_millis(2));
        t.add(Stage::Train, Duration::from_millis(1));
        assert_eq!(t.get(Stage::Compress), Duration::from_millis(5));
        assert_eq!(t.compress, Duration::from_millis(5));
        assert_eq!(t.get(Stage::Sample), Duration::ZERO);
        assert_eq!(t.total(), Duration::from_millis(6));
        assert!(t.has_all(&[Stage::Compress, Stage::Train]));
        assert!(!t.has_all(&Stage::ALL));
    }

    #[test]
    fn timer_charges_closure_time() {
        let mut timer = TelemetryTimer::new();
        let out = timer.time(Stage::Train, || {
            std::thread::sleep(Duration::from_millis(5));
            42
        });
        assert_eq!(out, 42);
        assert!(timer.stage_times.get(Stage::Train) >= Duration::from_millis(5));
        timer.finish();
        let frozen = timer.elapsed();
        std::thread::sleep(Duration::from_millis(2));
        timer.finish();
        assert_eq!(timer.elapsed(), frozen);
    }

    #[test]
    fn snapshot_ratio_and_json() {
        let counters = make_counters();
        let mut timer = TelemetryTimer::new();
        timer.add_stage_time(Stage::Compress, Duration::from_millis(2));
        std::thread::sleep(Duration::from_millis(5));
        timer.finish();

        let snap = TelemetrySnapshot::from(&counters, &timer);
        assert!((snap.compression_ratio - 2.0).abs() < 1e-9);
        assert_eq!(snap.bytes_saved(), 2_000);
        assert!(snap.throughput_raw_bytes_per_sec > 0.0);
        assert!(snap.elapsed >= Duration::from_millis(5));
        assert!(snap.has_all_stages(&[Stage::Compress]));
        assert_eq!(snap.total_stage_time(), Duration::from_millis(2));

        let json = snap.to_json().unwrap();
        let back: TelemetrySnapshot = serde_json::from_str(&json).unwrap();
        assert_eq!(back.counters, counters);
        assert_eq!(back.stage_times, snap.stage_times);
    }

    #[test]
    fn empty_snapshot_reports_unit_ratio() {
        let mut timer = TelemetryTimer::new();
        timer.finish();
        let snap = TelemetrySnapshot::from(&TelemetryCounters::default(), &timer);
        assert_eq!(snap.compression_ratio, 1.0);
        assert_eq!(snap.bytes_saved(), 0);
        assert_eq!(Stage::Compress.to_string(), "compress");
    }
}
