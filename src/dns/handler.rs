//! DNS Request Handler
//!
//! Turns a decoded request into a response message using the configured
//! answer provider, and turns undecodable datagrams into error responses.

use std::sync::Arc;
use tracing::{debug, error};

use crate::api::Metrics;
use crate::dns::{AnswerProvider, Lookup};
use crate::wire::{self, Header, Message, Opcode, ResponseCode, WireError};

/// DNS handler shared by all request tasks
pub struct DnsHandler {
    /// Answer source
    provider: Arc<dyn AnswerProvider>,

    /// Metrics sink
    metrics: Arc<Metrics>,

    /// Response size limit (bytes)
    max_packet_size: usize,
}

impl DnsHandler {
    /// Create a new DNS handler
    pub fn new(
        provider: Arc<dyn AnswerProvider>,
        metrics: Arc<Metrics>,
        max_packet_size: usize,
    ) -> Self {
        Self {
            provider,
            metrics,
            max_packet_size,
        }
    }

    /// Raw request in, raw response out
    ///
    /// Always yields a response: decode failures become FORMERR-style
    /// replies and an unencodable response becomes SERVFAIL.
    pub async fn process(&self, request: &[u8]) -> Vec<u8> {
        let response = match wire::decode(request) {
            Ok(message) => self.handle(&message).await,
            Err(e) => {
                debug!("Undecodable request ({}): {}", e, hex::encode(request));
                self.metrics.inc_decode_errors();
                Self::error_response(request, &e)
            }
        };

        let rcode = response.header.rcode;
        match self.encode_bounded(response) {
            Ok(bytes) => {
                self.metrics.record_rcode(rcode);
                bytes
            }
            Err(e) => {
                error!("Failed to encode response: {}", e);
                let fallback = Self::error_response(request, &e);
                self.metrics.record_rcode(fallback.header.rcode);
                fallback.header.encode().to_vec()
            }
        }
    }

    /// Build the response to a decoded request
    pub async fn handle(&self, request: &Message) -> Message {
        let mut response = Message::new(Self::response_header(&request.header));
        response.questions = request.questions.clone();

        if let Err(e) = Self::check_supported(request) {
            debug!("Query {} rejected: {}", request.id(), e);
            response.header.rcode = e.response_code();
            return response;
        }

        let mut name_exists = false;
        for question in &request.questions {
            debug!("DNS query: {} {} {}", question.name, question.qtype, question.qclass);

            match self.provider.resolve(question).await {
                Lookup::Found(records) => {
                    name_exists = true;
                    response.answers.extend(records);
                }
                Lookup::NoData => name_exists = true,
                Lookup::NotFound => {}
            }
        }

        // NXDOMAIN only when no asked name exists; a known name without
        // records of the asked type is NOERROR with an empty answer section
        if !name_exists {
            response.header.rcode = ResponseCode::NXDomain;
        }
        response.header.authoritative = self.provider.is_authoritative();

        response
    }

    /// Response for a datagram that could not be decoded
    ///
    /// Echoes the ID when at least two bytes arrived, and the opcode and
    /// RD bit when the whole header did.
    pub fn error_response(request: &[u8], error: &WireError) -> Message {
        let mut header = match Header::decode(request) {
            Ok(request_header) => Self::response_header(&request_header),
            Err(_) => Header {
                id: match request {
                    [hi, lo, ..] => u16::from_be_bytes([*hi, *lo]),
                    _ => 0,
                },
                response: true,
                ..Default::default()
            },
        };
        header.rcode = error.response_code();

        Message::new(header)
    }

    /// Response header skeleton: same ID, opcode and RD, QR set
    fn response_header(request: &Header) -> Header {
        Header {
            id: request.id,
            response: true,
            opcode: request.opcode,
            recursion_desired: request.recursion_desired,
            ..Default::default()
        }
    }

    fn check_supported(request: &Message) -> Result<(), WireError> {
        if request.header.opcode != Opcode::Query {
            return Err(WireError::UnsupportedOpcode(request.header.opcode.to_u8()));
        }

        if request.questions.is_empty() {
            return Err(WireError::NoQuestions);
        }

        if let Some(q) = request.questions.iter().find(|q| q.qtype.is_unknown()) {
            return Err(WireError::UnsupportedType(q.qtype.to_u16()));
        }

        Ok(())
    }

    /// Encode, falling back to a truncated (TC) reply when too large
    fn encode_bounded(&self, mut response: Message) -> Result<Vec<u8>, WireError> {
        let bytes = wire::encode(&response)?;
        if bytes.len() <= self.max_packet_size {
            return Ok(bytes);
        }

        debug!(
            "Response {} is {} bytes, truncating to fit {}",
            response.id(),
            bytes.len(),
            self.max_packet_size
        );

        response.header.truncated = true;
        response.answers.clear();
        response.authority.clear();
        response.additional.clear();

        let bytes = wire::encode(&response)?;
        if bytes.len() <= self.max_packet_size {
            return Ok(bytes);
        }

        response.questions.clear();
        wire::encode(&response)
    }
}
