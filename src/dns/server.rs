//! UDP DNS Server
//!
//! Receives one datagram at a time into a bounded buffer and hands each
//! to its own task, which runs the decode/respond/encode pipeline and
//! sends the reply back to the source address.

use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::UdpSocket;
use tracing::{debug, error, info};

use crate::api::Metrics;
use crate::config::ServerConfig;
use crate::dns::DnsHandler;

/// UDP listener bound to the configured address
pub struct DnsServer {
    socket: Arc<UdpSocket>,
    handler: Arc<DnsHandler>,
    metrics: Arc<Metrics>,
    max_packet_size: usize,
}

impl DnsServer {
    /// Bind the DNS socket
    pub async fn bind(
        config: &ServerConfig,
        handler: Arc<DnsHandler>,
        metrics: Arc<Metrics>,
    ) -> anyhow::Result<Self> {
        let addr = SocketAddr::new(config.listen_addr, config.dns_port);
        let socket = UdpSocket::bind(addr).await?;

        info!("🌐 DNS server listening on {}", socket.local_addr()?);

        Ok(Self {
            socket: Arc::new(socket),
            handler,
            metrics,
            max_packet_size: config.max_packet_size,
        })
    }

    pub fn local_addr(&self) -> anyhow::Result<SocketAddr> {
        Ok(self.socket.local_addr()?)
    }

    /// Serve until the task is cancelled
    pub async fn run(self) -> anyhow::Result<()> {
        let mut buf = vec![0u8; self.max_packet_size];

        loop {
            match self.socket.recv_from(&mut buf).await {
                Ok((len, src)) => {
                    self.metrics.inc_datagrams_received();

                    let request = buf[..len].to_vec();
                    let handler = self.handler.clone();
                    let socket = self.socket.clone();
                    let metrics = self.metrics.clone();

                    tokio::spawn(async move {
                        if let Err(e) =
                            handle_datagram(socket.as_ref(), src, &request, &handler).await
                        {
                            metrics.inc_send_failures();
                            debug!("DNS reply to {} failed: {}", src, e);
                        } else {
                            metrics.inc_responses_sent();
                        }
                    });
                }
                Err(e) => {
                    error!("DNS socket error: {}", e);
                }
            }
        }
    }
}

/// Bind and serve with the shared handler
pub async fn run_dns_server(
    config: Arc<ServerConfig>,
    handler: Arc<DnsHandler>,
    metrics: Arc<Metrics>,
) -> anyhow::Result<()> {
    DnsServer::bind(&config, handler, metrics).await?.run().await
}

/// Handle a single DNS datagram
async fn handle_datagram(
    socket: &UdpSocket,
    src: SocketAddr,
    request: &[u8],
    handler: &DnsHandler,
) -> anyhow::Result<()> {
    debug!("Received {} bytes from {}", request.len(), src);

    let response = handler.process(request).await;
    socket.send_to(&response, src).await?;

    debug!("Sent {} bytes to {}", response.len(), src);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dns::StaticZone;
    use crate::wire::{self, Header, Message, Question, RecordClass, RecordType, ResponseCode};
    use std::time::Duration;

    async fn start_server() -> (SocketAddr, Arc<Metrics>) {
        let config = ServerConfig::default().with_dns_port(Some(0));
        let metrics = Arc::new(Metrics::new());
        let zone = StaticZone::from_config(&config).unwrap();
        let handler = Arc::new(DnsHandler::new(
            Arc::new(zone),
            metrics.clone(),
            config.max_packet_size,
        ));

        let server = DnsServer::bind(&config, handler, metrics.clone()).await.unwrap();
        let addr = server.local_addr().unwrap();
        tokio::spawn(server.run());

        (addr, metrics)
    }

    async fn exchange(server: SocketAddr, request: &[u8]) -> Vec<u8> {
        let client = UdpSocket::bind("127.0.0.1:0").await.unwrap();
        client.send_to(request, server).await.unwrap();

        let mut buf = [0u8; 512];
        let (len, from) = tokio::time::timeout(Duration::from_secs(5), client.recv_from(&mut buf))
            .await
            .expect("timed out waiting for response")
            .unwrap();
        assert_eq!(from, server);
        buf[..len].to_vec()
    }

    #[tokio::test]
    async fn test_udp_query_roundtrip() {
        let (addr, metrics) = start_server().await;

        let mut header = Header::new(1234);
        header.recursion_desired = true;
        let mut request = Message::new(header);
        request.questions.push(Question::new(
            "codecrafters.io".parse().unwrap(),
            RecordType::A,
            RecordClass::IN,
        ));

        let bytes = exchange(addr, &wire::encode(&request).unwrap()).await;
        let response = wire::decode(&bytes).unwrap();

        assert_eq!(response.header.id, 1234);
        assert!(response.header.response);
        assert_eq!(response.header.rcode, ResponseCode::NoError);
        assert_eq!(response.answers.len(), 1);
        assert_eq!(response.answers[0].data, vec![8, 8, 8, 8]);
        assert!(metrics.snapshot().datagrams_received >= 1);
    }

    #[tokio::test]
    async fn test_udp_garbage_gets_formerr() {
        let (addr, _metrics) = start_server().await;

        let bytes = exchange(addr, &[0xAB, 0xCD, 0x01]).await;
        let response = wire::decode(&bytes).unwrap();

        assert_eq!(response.header.id, 0xABCD);
        assert_eq!(response.header.rcode, ResponseCode::FormErr);
    }
}
