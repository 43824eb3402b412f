//! Responder Configuration
//!
//! Configurable parameters for the DNS responder.
//! Defaults reproduce the classic fixed answer: every A question for any
//! name is answered with 8.8.8.8 and a 60 second TTL.

use serde::{Deserialize, Serialize};
use std::net::{IpAddr, Ipv4Addr};
use std::path::Path;

use crate::wire::{HEADER_SIZE, MAX_UDP_PAYLOAD};

/// Main configuration for the responder
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    // === Network ===

    /// Address the DNS socket binds to
    pub listen_addr: IpAddr,

    /// Port for the DNS server (UDP)
    pub dns_port: u16,

    /// Port for HTTP API
    pub api_port: u16,

    /// Serve the HTTP API at all
    pub enable_api: bool,

    /// Receive buffer and response size limit (bytes)
    pub max_packet_size: usize,

    // === Answers ===

    /// TTL for records that do not set one (seconds)
    pub default_ttl: u32,

    /// Set AA on responses from the zone
    pub authoritative: bool,

    /// Address returned for any A/IN question with no explicit record
    pub fallback_ipv4: Option<Ipv4Addr>,

    // === Timing ===

    /// Interval for the periodic stats log line (seconds)
    pub stats_interval_secs: u64,

    // === Zone ===

    /// Explicit zone records (kept last: TOML tables follow plain values)
    pub records: Vec<ZoneRecordConfig>,
}

/// One `[[records]]` entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ZoneRecordConfig {
    /// Owner name, e.g. "codecrafters.io"
    pub name: String,

    /// Record type mnemonic: A, AAAA, TXT, CNAME, NS, PTR, MX
    #[serde(rename = "type")]
    pub record_type: String,

    /// Overrides `default_ttl`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ttl: Option<u32>,

    /// Presentation-format value, e.g. "8.8.8.8" or "10 mail.example.com"
    pub value: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            // Network
            listen_addr: IpAddr::V4(Ipv4Addr::LOCALHOST),
            dns_port: 2053, // Use 53 in production with proper permissions
            api_port: 8080,
            enable_api: true,
            max_packet_size: MAX_UDP_PAYLOAD,

            // Answers
            default_ttl: 60,
            authoritative: true,
            fallback_ipv4: Some(Ipv4Addr::new(8, 8, 8, 8)),

            // Timing
            stats_interval_secs: 60,

            // Zone
            records: vec![],
        }
    }
}

impl ServerConfig {
    /// Load configuration from TOML file
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&content)?;
        Ok(config)
    }

    /// Save configuration to TOML file
    pub fn save(&self, path: &Path) -> anyhow::Result<()> {
        std::fs::write(path, self.to_toml()?)?;
        Ok(())
    }

    pub fn to_toml(&self) -> anyhow::Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    // Builder-style methods for CLI overrides

    pub fn with_listen_addr(mut self, addr: Option<IpAddr>) -> Self {
        if let Some(addr) = addr {
            self.listen_addr = addr;
        }
        self
    }

    pub fn with_dns_port(mut self, port: Option<u16>) -> Self {
        if let Some(port) = port {
            self.dns_port = port;
        }
        self
    }

    pub fn with_api_port(mut self, port: Option<u16>) -> Self {
        if let Some(port) = port {
            self.api_port = port;
        }
        self
    }

    pub fn with_api_enabled(mut self, enabled: bool) -> Self {
        self.enable_api = enabled;
        self
    }

    /// Validate configuration values
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.enable_api && self.dns_port != 0 && self.api_port == self.dns_port {
            anyhow::bail!(
                "api_port ({}) must differ from dns_port ({})",
                self.api_port,
                self.dns_port
            );
        }

        if !(HEADER_SIZE..=MAX_UDP_PAYLOAD).contains(&self.max_packet_size) {
            anyhow::bail!(
                "max_packet_size ({}) must be between {} and {}",
                self.max_packet_size,
                HEADER_SIZE,
                MAX_UDP_PAYLOAD
            );
        }

        if self.stats_interval_secs == 0 {
            anyhow::bail!("stats_interval_secs must be greater than zero");
        }

        for record in &self.records {
            record
                .to_record(self.default_ttl)
                .map_err(|e| {
                    anyhow::anyhow!("invalid record {} {}: {}", record.name, record.record_type, e)
                })?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ServerConfig::default();
        assert_eq!(config.dns_port, 2053);
        assert_eq!(config.max_packet_size, 512);
        assert_eq!(config.fallback_ipv4, Some(Ipv4Addr::new(8, 8, 8, 8)));
        assert_eq!(config.default_ttl, 60);
    }

    #[test]
    fn test_config_validation() {
        let mut config = ServerConfig::default();
        assert!(config.validate().is_ok());

        // Invalid: ports clash
        config.api_port = config.dns_port;
        assert!(config.validate().is_err());

        // Fine once the API is off
        config.enable_api = false;
        assert!(config.validate().is_ok());

        config.max_packet_size = 4096;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_invalid_record_rejected() {
        let mut config = ServerConfig::default();
        config.records.push(ZoneRecordConfig {
            name: "example.com".to_string(),
            record_type: "A".to_string(),
            ttl: None,
            value: "not-an-ip".to_string(),
        });

        assert!(config.validate().is_err());
    }

    #[test]
    fn test_builder_methods() {
        let config = ServerConfig::default()
            .with_listen_addr(Some("0.0.0.0".parse().unwrap()))
            .with_dns_port(Some(5354))
            .with_api_port(None)
            .with_api_enabled(false);

        assert_eq!(config.listen_addr.to_string(), "0.0.0.0");
        assert_eq!(config.dns_port, 5354);
        assert_eq!(config.api_port, 8080);
        assert!(!config.enable_api);
    }

    #[test]
    fn test_load_partial_toml() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("dns-responder.toml");
        std::fs::write(
            &path,
            r#"
dns_port = 5300
fallback_ipv4 = "1.1.1.1"

[[records]]
name = "codecrafters.io"
type = "A"
value = "8.8.4.4"
ttl = 120
"#,
        )
        .unwrap();

        let config = ServerConfig::load(&path).unwrap();
        assert_eq!(config.dns_port, 5300);
        assert_eq!(config.api_port, 8080);
        assert_eq!(config.fallback_ipv4, Some(Ipv4Addr::new(1, 1, 1, 1)));
        assert_eq!(config.records.len(), 1);
        assert_eq!(config.records[0].ttl, Some(120));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_save_load_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("saved.toml");

        let mut config = ServerConfig::default().with_dns_port(Some(6053));
        config.records.push(ZoneRecordConfig {
            name: "txt.example".to_string(),
            record_type: "TXT".to_string(),
            ttl: Some(5),
            value: "hello world".to_string(),
        });
        config.save(&path).unwrap();

        assert_eq!(ServerConfig::load(&path).unwrap(), config);
    }
}
