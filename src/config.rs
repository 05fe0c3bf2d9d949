use crate::common::constants::{LINE_BYTES, MAX_INDEX_BITS};
use crate::common::SimError;
use serde::Deserialize;
use std::fs;
use std::path::Path;

const DEFAULT_CORES: usize = 4;
const DEFAULT_INDEX_BITS: u32 = 6;
const DEFAULT_WAYS: usize = 4;
const DEFAULT_PREFETCH_QUEUE: usize = 8;

const DEFAULT_LOCAL_SIZE: usize = 1024 * 1024;
const DEFAULT_HOST_SIZE: usize = 1024 * 1024;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    #[serde(default)]
    pub general: GeneralConfig,
    #[serde(default)]
    pub cache: CacheConfig,
    #[serde(default)]
    pub memory: MemoryConfig,
}

impl Default for Config {
    /// Returns the reference configuration: 4 cores, 64 sets of 4 ways each.
    fn default() -> Self {
        Self {
            general: GeneralConfig::default(),
            cache: CacheConfig::default(),
            memory: MemoryConfig::default(),
        }
    }
}

impl Config {
    /// Loads and validates a configuration from a TOML file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, SimError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|source| SimError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let config = Self::from_toml(&content).map_err(|e| match e {
            SimError::Parse { source, .. } => SimError::Parse {
                path: path.display().to_string(),
                source,
            },
            other => other,
        })?;
        Ok(config)
    }

    /// Parses and validates a configuration from a TOML string.
    pub fn from_toml(content: &str) -> Result<Self, SimError> {
        let config: Config = toml::from_str(content).map_err(|source| SimError::Parse {
            path: "<inline>".to_string(),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Rejects geometries the cache arena cannot be built with.
    pub fn validate(&self) -> Result<(), SimError> {
        if self.cache.cores == 0 {
            return Err(SimError::InvalidConfig("cache.cores must be at least 1".into()));
        }
        if self.cache.ways == 0 {
            return Err(SimError::InvalidConfig("cache.ways must be at least 1".into()));
        }
        if self.cache.index_bits > MAX_INDEX_BITS {
            return Err(SimError::InvalidConfig(format!(
                "cache.index_bits must be at most {}, got {}",
                MAX_INDEX_BITS, self.cache.index_bits
            )));
        }
        for (name, raw) in [
            ("memory.local_size", &self.memory.local_size),
            ("memory.host_size", &self.memory.host_size),
        ] {
            let size = parse_size(raw).ok_or_else(|| {
                SimError::InvalidConfig(format!("{} is not a hex byte count: {:?}", name, raw))
            })?;
            if size % LINE_BYTES as usize != 0 {
                return Err(SimError::InvalidConfig(format!(
                    "{} must be a multiple of {} bytes, got {:#x}",
                    name, LINE_BYTES, size
                )));
            }
        }
        Ok(())
    }
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct GeneralConfig {
    /// Route cache and register events to the log at `trace` level.
    #[serde(default)]
    pub trace: bool,
}

#[derive(Debug, Deserialize, Clone)]
pub struct CacheConfig {
    #[serde(default = "default_cores")]
    pub cores: usize,

    #[serde(default = "default_index_bits")]
    pub index_bits: u32,

    #[serde(default = "default_ways")]
    pub ways: usize,

    #[serde(default = "default_prefetch_queue")]
    pub prefetch_queue: usize,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            cores: default_cores(),
            index_bits: default_index_bits(),
            ways: default_ways(),
            prefetch_queue: default_prefetch_queue(),
        }
    }
}

impl CacheConfig {
    /// Number of sets in each L0 cache.
    pub fn sets(&self) -> usize {
        1 << self.index_bits
    }

    /// Capacity of each L0 cache in bytes.
    pub fn size_bytes(&self) -> usize {
        self.sets() * self.ways * LINE_BYTES as usize
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct MemoryConfig {
    /// Size of device-local memory in bytes (hex string).
    #[serde(default = "default_local_size")]
    pub local_size: String,

    /// Size of host-backed memory in bytes (hex string).
    #[serde(default = "default_host_size")]
    pub host_size: String,
}

impl Default for MemoryConfig {
    fn default() -> Self {
        Self {
            local_size: default_local_size(),
            host_size: default_host_size(),
        }
    }
}

impl MemoryConfig {
    pub fn local_size_val(&self) -> usize {
        parse_hex(&self.local_size, DEFAULT_LOCAL_SIZE)
    }

    pub fn host_size_val(&self) -> usize {
        parse_hex(&self.host_size, DEFAULT_HOST_SIZE)
    }
}

fn parse_size(s: &str) -> Option<usize> {
    usize::from_str_radix(s.trim_start_matches("0x"), 16).ok()
}

fn parse_hex(s: &str, default: usize) -> usize {
    parse_size(s).unwrap_or(default)
}

fn default_cores() -> usize {
    DEFAULT_CORES
}

fn default_index_bits() -> u32 {
    DEFAULT_INDEX_BITS
}

fn default_ways() -> usize {
    DEFAULT_WAYS
}

fn default_prefetch_queue() -> usize {
    DEFAULT_PREFETCH_QUEUE
}

fn default_local_size() -> String {
    format!("{:#x}", DEFAULT_LOCAL_SIZE)
}

fn default_host_size() -> String {
    format!("{:#x}", DEFAULT_HOST_SIZE)
}
