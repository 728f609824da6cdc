//! compression/codecs/mod.rs
//! Built-in backends. Each one satisfies `CompressionBackend` on its own;
//! the registry binds them to their stable type codes.

pub mod lz4;
pub mod lz4hc;
pub mod none;
pub mod snappy;
pub mod zlib;
pub mod zstd;

pub use self::lz4::Lz4Backend;
pub use self::lz4hc::Lz4HcBackend;
pub use self::none::NoCompressionBackend;
pub use self::snappy::SnappyBackend;
pub use self::zlib::ZlibBackend;
pub use self::zstd::ZstdBackend;
