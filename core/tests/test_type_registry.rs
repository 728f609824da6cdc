#[cfg(test)]
mod type_registry_tests {
    use std::sync::Arc;

    use blockpress_core::compression::codecs::NoCompressionBackend;
    use blockpress_core::compression::{
        BuiltinCompression, CodecCapabilities, CodecInfo, CodecParams, CompressionBackend,
        CompressionRegistry, CompressionType,
    };
    use blockpress_core::types::{CompressionError, Result};

    #[test]
    fn builtin_codes_are_stable() {
        assert_eq!(CompressionType::NONE.as_u8(), 0x00);
        assert_eq!(CompressionType::SNAPPY.as_u8(), 0x01);
        assert_eq!(CompressionType::ZLIB.as_u8(), 0x02);
        assert_eq!(CompressionType::BZIP2.as_u8(), 0x03);
        assert_eq!(CompressionType::LZ4.as_u8(), 0x04);
        assert_eq!(CompressionType::LZ4HC.as_u8(), 0x05);
        assert_eq!(CompressionType::XPRESS.as_u8(), 0x06);
        assert_eq!(CompressionType::ZSTD.as_u8(), 0x07);
        assert_eq!(CompressionType::DISABLED.as_u8(), 0xff);
    }

    #[test]
    fn code_ranges_partition_the_byte() {
        for raw in 0u8..=255 {
            let t = CompressionType::from_u8(raw);
            let classes = [t.is_builtin(), t.is_reserved(), t.is_custom(), t.is_disabled()];
            assert_eq!(classes.iter().filter(|c| **c).count(), 1, "code {raw:#04x}");
            assert_eq!(t.is_block_code(), raw <= 0x07 || (0x80..=0xfe).contains(&raw));
        }
    }

    #[test]
    fn builtin_lookup_and_names() {
        assert_eq!(CompressionType::ZSTD.builtin(), Some(BuiltinCompression::Zstd));
        assert_eq!(CompressionType::from_u8(0x80).builtin(), None);
        assert_eq!(CompressionType::ZSTD.to_string(), "zstd");
        assert_eq!(CompressionType::from_u8(0x81).to_string(), "custom(0x81)");
        assert_eq!(CompressionType::from_u8(0x10).to_string(), "reserved(0x10)");
        assert_eq!(CompressionType::DISABLED.to_string(), "disabled");
    }

    #[test]
    fn custom_constructor_checks_range() {
        assert!(CompressionType::custom(0x80).is_ok());
        assert!(CompressionType::custom(0xfe).is_ok());
        for bad in [0x00, 0x07, 0x08, 0x7f, 0xff] {
            assert!(matches!(
                CompressionType::custom(bad),
                Err(CompressionError::CodeOutOfRange { code }) if code == bad
            ));
        }
    }

    #[test]
    fn builtins_registered() {
        let registry = CompressionRegistry::with_builtins();
        for t in [
            CompressionType::NONE,
            CompressionType::SNAPPY,
            CompressionType::ZLIB,
            CompressionType::LZ4,
            CompressionType::LZ4HC,
            CompressionType::ZSTD,
        ] {
            assert!(registry.is_registered(t), "{t} missing");
        }
        assert_eq!(registry.len(), 6);
        assert!(matches!(
            registry.resolve(CompressionType::BZIP2),
            Err(CompressionError::NotRegistered(t)) if t == CompressionType::BZIP2
        ));
        assert!(registry.resolve(CompressionType::XPRESS).is_err());
    }

    #[test]
    fn out_of_range_registration_leaves_registry_untouched() {
        let mut registry = CompressionRegistry::with_builtins();
        let before: Vec<_> = registry.registered_types().collect();

        for code in [0x00, 0x05, 0x08, 0x7f, 0xff] {
            let err = registry.register_custom(code, Arc::new(NoCompressionBackend)).unwrap_err();
            assert!(err.is_configuration());
        }

        let after: Vec<_> = registry.registered_types().collect();
        assert_eq!(before, after);
    }

    #[test]
    fn duplicate_registration_keeps_first() {
        struct Tagged;
        impl CompressionBackend for Tagged {
            fn info(&self) -> CodecInfo {
                CodecInfo { name: "tagged", capabilities: CodecCapabilities::empty(), default_level: None }
            }
            fn compress(&self, raw: &[u8], _params: &CodecParams<'_>) -> Result<Vec<u8>> {
                Ok(raw.to_vec())
            }
            fn decompress(&self, c: &[u8], _dict: Option<&[u8]>) -> Result<Vec<u8>> {
                Ok(c.to_vec())
            }
        }

        let mut registry = CompressionRegistry::new();
        let t = registry.register_custom(0x90, Arc::new(Tagged)).unwrap();
        assert_eq!(t.as_u8(), 0x90);

        let err = registry.register_custom(0x90, Arc::new(NoCompressionBackend)).unwrap_err();
        assert!(matches!(err, CompressionError::CodeAlreadyRegistered(c) if c == t));
        assert_eq!(registry.info(t).unwrap().name, "tagged");
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn empty_registry_has_nothing() {
        let registry = CompressionRegistry::new();
        assert!(registry.is_empty());
        assert!(registry.resolve(CompressionType::NONE).is_err());
    }
}
