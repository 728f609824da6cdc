#[cfg(test)]
mod session_tests {
    use std::sync::Arc;

    use bytes::Bytes;

    use blockpress_core::compression::{
        BlockOutcome, CompressionOptions, CompressionRegistry, CompressionType, TypeSelection,
    };
    use blockpress_core::dictionary::{
        CacheMemoryAccountant, Dictionary, DictionaryOrigin, SamplerState, SamplingPolicy,
        UnlimitedAccountant,
    };
    use blockpress_core::session::{CompressionSession, SessionConfig, SessionState};
    use blockpress_core::telemetry::Stage;
    use blockpress_core::types::CompressionError;

    fn registry() -> Arc<CompressionRegistry> {
        Arc::new(CompressionRegistry::with_builtins())
    }

    /// Key-value-ish block: shared structure, varying keys.
    fn kv_block(i: usize, len: usize) -> Bytes {
        let mut out = Vec::with_capacity(len);
        let mut k = 0usize;
        while out.len() < len {
            out.extend_from_slice(
                format!("key:{:08}:{:04}|value:customer-record-status=active;", i, k).as_bytes(),
            );
            k += 1;
        }
        out.truncate(len);
        Bytes::from(out)
    }

    fn dict_session(
        options: CompressionOptions,
        accountant: Arc<CacheMemoryAccountant>,
        target: u64,
    ) -> CompressionSession {
        CompressionSession::configure(
            registry(),
            accountant,
            SessionConfig::new(options, CompressionType::ZSTD).with_file_size_target(target),
        )
        .unwrap()
    }

    #[test]
    fn raw_sample_dictionary_end_to_end() {
        let options = CompressionOptions {
            max_dict_bytes: 16_384,
            zstd_max_train_bytes: 0,
            parallel_threads: 1,
            ..Default::default()
        };
        let accountant = Arc::new(CacheMemoryAccountant::new(1 << 20));
        let mut session = dict_session(options, accountant.clone(), 0);
        assert_eq!(session.sampler_state(), Some(SamplerState::Collecting));

        let raws: Vec<Bytes> = (0..10).map(|i| kv_block(i, 4_096)).collect();
        for raw in &raws {
            session.compress_block(raw.clone()).unwrap();
        }
        // Everything is held until the dictionary exists.
        assert!(session.take_ready().unwrap().is_empty());
        assert_eq!(accountant.used(), 40_960);
        assert_eq!(session.estimated_output_bytes(), 40_960);

        let decompressor = session.decompressor();
        let summary = session.finish().unwrap();
        assert_eq!(accountant.used(), 0);

        let dict = &summary.dictionary;
        assert_eq!(dict.origin(), DictionaryOrigin::RawSamples);
        assert_eq!(dict.len(), 16_384);
        assert_eq!(dict.as_slice(), &[&raws[0][..], &raws[1][..], &raws[2][..], &raws[3][..]].concat()[..]);

        assert_eq!(summary.blocks.len(), 10);
        for (i, block) in summary.blocks.iter().enumerate() {
            assert_eq!(block.index, i as u64);
            let code = block.compression_type;
            assert!(code == CompressionType::ZSTD || code == CompressionType::NONE);
            if code == CompressionType::ZSTD {
                assert_eq!(block.dictionary_id, Some(dict.id()));
            }
            let raw = decompressor.decompress_block(block, Some(dict)).unwrap();
            assert_eq!(raw, raws[i]);
        }
        assert!(summary.blocks.iter().any(|b| b.is_compressed()));

        let t = &summary.telemetry;
        assert_eq!(t.counters.blocks_submitted, 10);
        assert_eq!(t.counters.blocks_emitted(), 10);
        assert_eq!(t.counters.bytes_raw, 40_960);
        assert_eq!(t.counters.bytes_sampled, 40_960);
        assert_eq!(t.counters.bytes_dictionary, 16_384);
        assert!(t.compression_ratio > 1.0);
        assert!(t.stage_times.get(Stage::Compress) > std::time::Duration::ZERO);
    }

    #[test]
    fn wrong_dictionary_is_corruption() {
        let options = CompressionOptions { max_dict_bytes: 8_192, ..Default::default() };
        let mut session = dict_session(options, Arc::new(CacheMemoryAccountant::new(1 << 20)), 0);
        for i in 0..4 {
            session.compress_block(kv_block(i, 4_096)).unwrap();
        }
        let decompressor = session.decompressor();
        let summary = session.finish().unwrap();
        let block = summary.blocks.iter().find(|b| b.dictionary_id.is_some()).unwrap();

        let other = Dictionary::new(b"a different dictionary".to_vec(), DictionaryOrigin::Loaded);
        let err = decompressor.decompress_block(block, Some(&other)).unwrap_err();
        assert!(matches!(err, CompressionError::Corruption { .. }));
        assert!(decompressor.decompress_block(block, None).is_err());
    }

    #[test]
    fn file_size_target_finalizes_early() {
        let options = CompressionOptions { max_dict_bytes: 4_096, ..Default::default() };
        let accountant = Arc::new(CacheMemoryAccountant::new(1 << 20));
        let mut session = dict_session(options, accountant.clone(), 10_000);

        session.compress_block(kv_block(0, 4_096)).unwrap();
        session.compress_block(kv_block(1, 4_096)).unwrap();
        assert!(session.take_ready().unwrap().is_empty());
        session.compress_block(kv_block(2, 4_096)).unwrap();

        assert_eq!(session.sampler_state(), Some(SamplerState::Finalized));
        assert_eq!(accountant.used(), 0);
        let ready = session.take_ready().unwrap();
        assert_eq!(ready.iter().map(|b| b.index).collect::<Vec<_>>(), vec![0, 1, 2]);

        session.compress_block(kv_block(3, 4_096)).unwrap();
        let ready = session.take_ready().unwrap();
        assert_eq!(ready.len(), 1);
        assert_eq!(ready[0].dictionary_id, session.dictionary().map(Dictionary::id));
        session.finish().unwrap();
    }

    #[test]
    fn charge_denial_never_fails_the_session() {
        let options = CompressionOptions { max_dict_bytes: 16_384, ..Default::default() };
        let accountant = Arc::new(CacheMemoryAccountant::new(5_000));
        let mut session = dict_session(options, accountant.clone(), 0);

        for i in 0..6 {
            session.compress_block(kv_block(i, 4_096)).unwrap();
        }
        let summary = session.finish().unwrap();
        assert_eq!(summary.blocks.len(), 6);
        assert_eq!(summary.dictionary.len(), 4_096);
        assert_eq!(summary.telemetry.counters.charge_denials, 1);
        assert_eq!(accountant.used(), 0);
    }

    #[test]
    fn zero_capacity_accountant_gives_empty_dictionary() {
        let options = CompressionOptions { max_dict_bytes: 16_384, ..Default::default() };
        let mut session = dict_session(options, Arc::new(CacheMemoryAccountant::new(0)), 0);
        for i in 0..3 {
            session.compress_block(kv_block(i, 2_048)).unwrap();
        }
        let summary = session.finish().unwrap();
        assert!(summary.dictionary.is_empty());
        assert_eq!(summary.blocks.len(), 3);
        assert!(summary.blocks.iter().all(|b| b.dictionary_id.is_none()));
    }

    #[test]
    fn tiny_file_finalizes_empty_dictionary() {
        let options = CompressionOptions { max_dict_bytes: 16_384, ..Default::default() };
        let session = dict_session(options, Arc::new(CacheMemoryAccountant::new(1 << 20)), 0);
        let summary = session.finish().unwrap();
        assert!(summary.blocks.is_empty());
        assert!(summary.dictionary.is_empty());
        assert_eq!(summary.dictionary.id(), 0);
    }

    #[test]
    fn explicit_finalize_with_prefix_sampling() {
        let options = CompressionOptions { max_dict_bytes: 16_384, ..Default::default() };
        let mut session = CompressionSession::configure(
            registry(),
            Arc::new(UnlimitedAccountant),
            SessionConfig::new(options, CompressionType::LZ4).with_sampling(SamplingPolicy::Prefix(512)),
        )
        .unwrap();
        for i in 0..3 {
            session.compress_block(kv_block(i, 4_096)).unwrap();
        }
        let dict = session.finalize_dictionary().unwrap();
        assert_eq!(dict.len(), 1_536);
        assert_eq!(session.finalize_dictionary().unwrap(), dict);

        let decompressor = session.decompressor();
        let ready = session.take_ready().unwrap();
        assert_eq!(ready.len(), 3);
        for (i, block) in ready.iter().enumerate() {
            assert_eq!(block.compression_type, CompressionType::LZ4);
            assert_eq!(block.outcome, BlockOutcome::Compressed);
            assert_eq!(block.dictionary_id, Some(dict.id()));
            let raw = decompressor.decompress_block(block, Some(&dict)).unwrap();
            assert_eq!(raw, kv_block(i, 4_096));
        }
        session.finish().unwrap();
    }

    #[test]
    fn lz4_blocks_pass_the_default_gate() {
        let mut session = CompressionSession::configure(
            registry(),
            Arc::new(UnlimitedAccountant),
            SessionConfig::new(CompressionOptions::default(), CompressionType::LZ4),
        )
        .unwrap();
        let raw = kv_block(0, 4_096);
        session.compress_block(raw.clone()).unwrap();
        let decompressor = session.decompressor();
        let summary = session.finish().unwrap();

        let block = &summary.blocks[0];
        assert_eq!(block.compression_type, CompressionType::LZ4);
        assert_eq!(block.outcome, BlockOutcome::Compressed);
        assert!(block.stored_len() < 3_584);
        assert_eq!(decompressor.decompress_block(block, None).unwrap(), raw);
    }

    #[test]
    fn non_dictionary_backend_skips_sampling() {
        let options = CompressionOptions { max_dict_bytes: 16_384, ..Default::default() };
        let mut session = CompressionSession::configure(
            registry(),
            Arc::new(UnlimitedAccountant),
            SessionConfig::new(options, CompressionType::SNAPPY),
        )
        .unwrap();
        assert_eq!(session.sampler_state(), None);
        session.compress_block(kv_block(0, 4_096)).unwrap();
        let ready = session.take_ready().unwrap();
        assert_eq!(ready.len(), 1);
        assert_eq!(ready[0].compression_type, CompressionType::SNAPPY);
        assert!(session.finalize_dictionary().unwrap().is_empty());
    }

    #[test]
    fn disabled_and_none_store_verbatim() {
        for selection in [CompressionType::DISABLED, CompressionType::NONE] {
            let mut session = CompressionSession::configure(
                registry(),
                Arc::new(UnlimitedAccountant),
                SessionConfig::new(CompressionOptions::default(), selection),
            )
            .unwrap();
            let raw = kv_block(0, 1_000);
            session.compress_block(raw.clone()).unwrap();
            let summary = session.finish().unwrap();
            let block = &summary.blocks[0];
            assert_eq!(block.compression_type, CompressionType::NONE);
            assert_eq!(block.outcome, BlockOutcome::NotRequested);
            assert_eq!(block.data, raw);
        }
    }

    #[test]
    fn incompressible_blocks_fall_back_to_none() {
        let mut session = CompressionSession::configure(
            registry(),
            Arc::new(UnlimitedAccountant),
            SessionConfig::new(CompressionOptions::default(), CompressionType::ZLIB),
        )
        .unwrap();
        let mut state = 0x1234_5678u32;
        let noise: Vec<u8> = (0..4_096)
            .map(|_| {
                state ^= state << 13;
                state ^= state >> 17;
                state ^= state << 5;
                state as u8
            })
            .collect();
        session.compress_block(noise.clone()).unwrap();
        session.compress_block(b"".to_vec()).unwrap();
        let summary = session.finish().unwrap();
        assert_eq!(summary.blocks[0].compression_type, CompressionType::NONE);
        assert_eq!(summary.blocks[0].outcome, BlockOutcome::RatioRejected);
        assert_eq!(summary.blocks[0].data, noise);
        assert_eq!(summary.blocks[1].compression_type, CompressionType::NONE);
        assert_eq!(summary.telemetry.counters.blocks_rejected, 2);
    }

    #[test]
    fn round_robin_cycles_types() {
        let types = vec![CompressionType::LZ4, CompressionType::ZSTD, CompressionType::ZLIB];
        let mut session = CompressionSession::configure(
            registry(),
            Arc::new(UnlimitedAccountant),
            SessionConfig::new(CompressionOptions::default(), TypeSelection::RoundRobin(types.clone())),
        )
        .unwrap();
        for i in 0..6 {
            session.compress_block(kv_block(i, 4_096)).unwrap();
        }
        let decompressor = session.decompressor();
        let summary = session.finish().unwrap();
        for (i, block) in summary.blocks.iter().enumerate() {
            assert_eq!(block.compression_type, types[i % 3]);
            assert_eq!(decompressor.decompress_block(block, None).unwrap(), kv_block(i, 4_096));
        }
    }

    #[test]
    fn random_selection_stays_in_set() {
        let types = vec![CompressionType::SNAPPY, CompressionType::LZ4HC];
        let mut session = CompressionSession::configure(
            registry(),
            Arc::new(UnlimitedAccountant),
            SessionConfig::new(CompressionOptions::default(), TypeSelection::Random(types.clone())),
        )
        .unwrap();
        for i in 0..20 {
            session.compress_block(kv_block(i, 2_048)).unwrap();
        }
        let summary = session.finish().unwrap();
        assert!(summary.blocks.iter().all(|b| types.contains(&b.compression_type)));
    }

    #[test]
    fn configuration_errors_surface_at_configure() {
        let cases = [
            SessionConfig::new(CompressionOptions::default(), CompressionType::BZIP2),
            SessionConfig::new(CompressionOptions::default(), CompressionType::from_u8(0x85)),
            SessionConfig::new(CompressionOptions::default(), TypeSelection::RoundRobin(vec![])),
            SessionConfig::new(
                CompressionOptions { max_compressed_bytes_per_kb: 0, ..Default::default() },
                CompressionType::ZSTD,
            ),
        ];
        for config in cases {
            let err = CompressionSession::configure(registry(), Arc::new(UnlimitedAccountant), config)
                .err()
                .unwrap();
            assert!(err.is_configuration(), "{err}");
        }
    }

    #[test]
    fn dropping_a_session_releases_the_charge() {
        let accountant = Arc::new(CacheMemoryAccountant::new(1 << 20));
        {
            let options = CompressionOptions { max_dict_bytes: 16_384, ..Default::default() };
            let mut session = dict_session(options, accountant.clone(), 0);
            session.compress_block(kv_block(0, 4_096)).unwrap();
            assert_eq!(accountant.used(), 4_096);
            assert_eq!(session.state(), SessionState::Open);
        }
        assert_eq!(accountant.used(), 0);
    }

    #[test]
    fn parallel_dictionary_session() {
        let options = CompressionOptions {
            max_dict_bytes: 8_192,
            parallel_threads: 3,
            ..Default::default()
        };
        let mut session = dict_session(options, Arc::new(CacheMemoryAccountant::new(1 << 20)), 12_288);
        let mut blocks = Vec::new();
        for i in 0..16 {
            session.compress_block(kv_block(i, 4_096)).unwrap();
            blocks.extend(session.take_ready().unwrap());
        }
        let decompressor = session.decompressor();
        let summary = session.finish().unwrap();
        blocks.extend(summary.blocks);
        assert_eq!(blocks.len(), 16);
        for (i, block) in blocks.iter().enumerate() {
            assert_eq!(block.index, i as u64);
            let raw = decompressor.decompress_block(block, Some(&summary.dictionary)).unwrap();
            assert_eq!(raw, kv_block(i, 4_096));
        }
    }

    #[test]
    fn config_from_json() -> anyhow::Result<()> {
        let json = r#"{
            "options": { "max_dict_bytes": 4096, "parallel_threads": 2 },
            "selection": { "RoundRobin": [4, 7] },
            "file_size_target": 65536,
            "sampling": { "Prefix": 1024 }
        }"#;
        let config = SessionConfig::from_json(json)?;
        assert_eq!(config.options.max_dict_bytes, 4_096);
        assert_eq!(config.selection, TypeSelection::RoundRobin(vec![CompressionType::LZ4, CompressionType::ZSTD]));
        assert_eq!(config.sampling, SamplingPolicy::Prefix(1_024));
        assert_eq!(config.file_size_target, 65_536);

        let session = CompressionSession::configure(registry(), Arc::new(UnlimitedAccountant), config)?;
        assert!(session.is_parallel());
        assert_eq!(session.sampler_state(), Some(SamplerState::Collecting));
        Ok(())
    }
}
