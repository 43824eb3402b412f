//! Answer Providers
//!
//! The response builder asks an [`AnswerProvider`] for the records that
//! answer each question. [`StaticZone`] serves a fixed set of records
//! loaded from configuration, plus an optional catch-all IPv4 address.

use std::collections::HashMap;
use std::net::{Ipv4Addr, Ipv6Addr};

use async_trait::async_trait;
use rand::seq::SliceRandom;
use tracing::debug;

use crate::config::{ServerConfig, ZoneRecordConfig};
use crate::wire::{DomainName, Question, RecordClass, RecordType, ResourceRecord};

/// Outcome of resolving one question
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Lookup {
    Found(Vec<ResourceRecord>),
    /// The name exists but has no records of the asked type
    NoData,
    /// The name does not exist
    NotFound,
}

/// Source of answers for incoming questions
#[async_trait]
pub trait AnswerProvider: Send + Sync {
    async fn resolve(&self, question: &Question) -> Lookup;

    /// Whether responses from this provider carry the AA flag
    fn is_authoritative(&self) -> bool {
        false
    }
}

/// In-memory zone built from `[[records]]` config entries
#[derive(Debug, Clone, Default)]
pub struct StaticZone {
    /// Records keyed by lowercased owner name
    records: HashMap<DomainName, Vec<ResourceRecord>>,

    /// Catch-all answer for A/IN questions
    fallback_ipv4: Option<Ipv4Addr>,

    /// TTL for the catch-all answer (seconds)
    fallback_ttl: u32,

    authoritative: bool,
}

impl StaticZone {
    /// Create an empty zone
    pub fn new(authoritative: bool) -> Self {
        Self {
            authoritative,
            ..Default::default()
        }
    }

    /// Build the zone described by `config`
    pub fn from_config(config: &ServerConfig) -> anyhow::Result<Self> {
        let mut zone = Self::new(config.authoritative)
            .with_fallback(config.fallback_ipv4, config.default_ttl);

        for entry in &config.records {
            let record = entry.to_record(config.default_ttl).map_err(|e| {
                anyhow::anyhow!("invalid record {} {}: {}", entry.name, entry.record_type, e)
            })?;
            zone.insert(record);
        }

        Ok(zone)
    }

    pub fn with_fallback(mut self, addr: Option<Ipv4Addr>, ttl: u32) -> Self {
        self.fallback_ipv4 = addr;
        self.fallback_ttl = ttl;
        self
    }

    pub fn insert(&mut self, record: ResourceRecord) {
        self.records
            .entry(record.name.to_lowercase())
            .or_default()
            .push(record);
    }

    /// Total number of explicit records
    pub fn len(&self) -> usize {
        self.records.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn fallback_ipv4(&self) -> Option<Ipv4Addr> {
        self.fallback_ipv4
    }

    /// All explicit records, sorted by owner name
    pub fn records(&self) -> Vec<&ResourceRecord> {
        let mut all: Vec<_> = self.records.values().flatten().collect();
        all.sort_by_cached_key(|r| r.name.to_lowercase());
        all
    }

    /// Explicit records answering `question`, or `None` when the name
    /// has no explicit records at all
    fn matching(&self, question: &Question) -> Option<Vec<ResourceRecord>> {
        self.records.get(&question.name.to_lowercase()).map(|records| {
            records
                .iter()
                .filter(|r| r.rtype == question.qtype && question.qclass.matches(r.rclass))
                .map(|r| ResourceRecord {
                    // Echo the owner name as asked
                    name: question.name.clone(),
                    ..r.clone()
                })
                .collect()
        })
    }
}

#[async_trait]
impl AnswerProvider for StaticZone {
    async fn resolve(&self, question: &Question) -> Lookup {
        let explicit = self.matching(question);
        let name_exists = explicit.is_some() || self.fallback_ipv4.is_some();
        let mut answers = explicit.unwrap_or_default();

        if answers.is_empty() {
            if let Some(addr) = self.fallback_ipv4 {
                if question.qtype == RecordType::A && question.qclass.matches(RecordClass::IN) {
                    answers.push(ResourceRecord::a(
                        question.name.clone(),
                        addr,
                        self.fallback_ttl,
                    ));
                }
            }
        }

        if answers.is_empty() {
            debug!("No answer for {} {}", question.name, question.qtype);
            return if name_exists {
                Lookup::NoData
            } else {
                Lookup::NotFound
            };
        }

        // Shuffle for load distribution
        let mut rng = rand::thread_rng();
        answers.shuffle(&mut rng);

        Lookup::Found(answers)
    }

    fn is_authoritative(&self) -> bool {
        self.authoritative
    }
}

impl ZoneRecordConfig {
    /// Convert the presentation-format entry into a wire record
    pub fn to_record(&self, default_ttl: u32) -> Result<ResourceRecord, String> {
        let name: DomainName = self.name.parse().map_err(|e| format!("{}", e))?;
        let rtype: RecordType = self.record_type.parse()?;
        let ttl = self.ttl.unwrap_or(default_ttl);
        let value = self.value.trim();

        let data = match rtype {
            RecordType::A => value
                .parse::<Ipv4Addr>()
                .map_err(|e| format!("bad IPv4 address {:?}: {}", value, e))?
                .octets()
                .to_vec(),
            RecordType::AAAA => value
                .parse::<Ipv6Addr>()
                .map_err(|e| format!("bad IPv6 address {:?}: {}", value, e))?
                .octets()
                .to_vec(),
            RecordType::CNAME | RecordType::NS | RecordType::PTR => parse_target(value)?.to_bytes(),
            RecordType::MX => {
                let (preference, exchange) = value
                    .split_once(char::is_whitespace)
                    .ok_or_else(|| format!("MX value {:?} must be \"<preference> <host>\"", value))?;
                let preference: u16 = preference
                    .parse()
                    .map_err(|e| format!("bad MX preference {:?}: {}", preference, e))?;

                let mut data = preference.to_be_bytes().to_vec();
                parse_target(exchange.trim())?.encode(&mut data);
                data
            }
            RecordType::TXT => encode_character_strings(value.as_bytes()),
            other => return Err(format!("record type {} is not supported in zone config", other)),
        };

        ResourceRecord::new(name, rtype, RecordClass::IN, ttl, data).map_err(|e| e.to_string())
    }
}

fn parse_target(value: &str) -> Result<DomainName, String> {
    value.parse().map_err(|e| format!("{}", e))
}

/// TXT data: one or more <length><bytes> strings of at most 255 bytes
fn encode_character_strings(text: &[u8]) -> Vec<u8> {
    if text.is_empty() {
        return vec![0];
    }

    let mut data = Vec::with_capacity(text.len() + text.len() / 255 + 1);
    for chunk in text.chunks(255) {
        data.push(chunk.len() as u8);
        data.extend_from_slice(chunk);
    }
    data
}
