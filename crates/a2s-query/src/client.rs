//! A2S query client over UDP.
//!
//! One `A2sClient` is bound to one target for its whole life. Construction
//! resolves the target and binds the local socket; a failure there means
//! the client cannot function at all.
//!
//! The socket outlives any single query, so a query that is cancelled
//! mid-flight can leave its reply queued. Each query starts by discarding
//! whatever is already waiting on the socket.

use std::collections::HashMap;
use std::future::Future;
use std::io;
use std::net::{Ipv4Addr, Ipv6Addr, SocketAddr};
use std::time::Duration;

use tokio::net::UdpSocket;
use tracing::{debug, info};

use crate::error::{QueryError, QueryResult};
use crate::info::ServerInfo;
use crate::packet::{CHALLENGE_RESPONSE, Datagram, Reader, SplitAssembler, classify, info_request};

/// Default receive buffer size. Some engines send replies larger than the
/// 1400 bytes the protocol promises.
pub const DEFAULT_MAX_PACKET_SIZE: usize = 14_000;

/// Challenge round-trips tolerated before giving up.
const MAX_CHALLENGES: usize = 3;

/// Split messages reassembled concurrently within one receive.
const MAX_PENDING_SPLITS: usize = 4;

/// Something that can report the current server info.
///
/// Implemented by [`A2sClient`]; the engine only depends on this trait so
/// tests can script outcomes.
pub trait ProbeSource: Send + Sync {
    /// Fetch the current server info. Dropping the future abandons the query.
    fn query_info(&self) -> impl Future<Output = QueryResult<ServerInfo>> + Send;
}

/// Connection parameters for [`A2sClient::connect`].
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Host name or IP of the game server.
    pub address: String,
    /// Query port of the game server.
    pub port: u16,
    /// Receive buffer size in bytes.
    pub max_packet_size: usize,
    /// Per-datagram receive timeout.
    pub timeout: Duration,
}

impl ClientConfig {
    /// Defaults: 14000-byte buffer, 3 s receive timeout.
    pub fn new(address: impl Into<String>, port: u16) -> Self {
        Self {
            address: address.into(),
            port,
            max_packet_size: DEFAULT_MAX_PACKET_SIZE,
            timeout: Duration::from_secs(3),
        }
    }
}

/// UDP client for A2S_INFO queries against a single server.
#[derive(Debug)]
pub struct A2sClient {
    socket: UdpSocket,
    target: SocketAddr,
    max_packet_size: usize,
    timeout: Duration,
}

impl A2sClient {
    /// Resolve the target and bind a connected UDP socket to it.
    pub async fn connect(config: ClientConfig) -> QueryResult<Self> {
        let host = format!("{}:{}", config.address, config.port);
        let target = tokio::net::lookup_host(&host)
            .await
            .map_err(|e| QueryError::Resolve(format!("{host}: {e}")))?
            .next()
            .ok_or_else(|| QueryError::Resolve(host.clone()))?;

        let local: SocketAddr = if target.is_ipv4() {
            (Ipv4Addr::UNSPECIFIED, 0).into()
        } else {
            (Ipv6Addr::UNSPECIFIED, 0).into()
        };
        let socket = UdpSocket::bind(local).await?;
        socket.connect(target).await?;

        info!(%target, max_packet_size = config.max_packet_size, "a2s client ready");

        Ok(Self {
            socket,
            target,
            max_packet_size: config.max_packet_size,
            timeout: config.timeout,
        })
    }

    /// Run one A2S_INFO exchange, answering challenges as needed.
    pub async fn info(&self) -> QueryResult<ServerInfo> {
        self.discard_pending()?;
        let mut challenge = None;

        for _ in 0..=MAX_CHALLENGES {
            self.socket.send(&info_request(challenge)).await?;
            let body = self.recv_message().await?;

            match body.first() {
                None => return Err(QueryError::EmptyResponse),
                Some(&CHALLENGE_RESPONSE) => {
                    let mut r = Reader::new(&body[1..]);
                    challenge = Some(r.bytes4("challenge")?);
                    debug!(addr = %self.target, "a2s challenge received");
                }
                Some(_) => return ServerInfo::parse(&body),
            }
        }

        Err(QueryError::TooManyChallenges(MAX_CHALLENGES))
    }

    /// Drop datagrams left over from earlier, abandoned queries.
    fn discard_pending(&self) -> QueryResult<()> {
        let mut buf = vec![0u8; self.max_packet_size];
        let mut dropped = 0usize;

        loop {
            match self.socket.try_recv(&mut buf) {
                Ok(_) => dropped += 1,
                Err(e) if e.kind() == io::ErrorKind::WouldBlock => break,
                // ICMP unreachable from an earlier request; stale as well.
                Err(e) if e.kind() == io::ErrorKind::ConnectionRefused => dropped += 1,
                Err(e) => return Err(e.into()),
            }
        }

        if dropped > 0 {
            debug!(addr = %self.target, dropped, "discarded stale datagrams");
        }
        Ok(())
    }

    /// Receive one complete message, reassembling split responses.
    ///
    /// Fragments are grouped by split id; the first message to complete
    /// wins and partial ones are dropped with it.
    async fn recv_message(&self) -> QueryResult<Vec<u8>> {
        let mut buf = vec![0u8; self.max_packet_size];
        let mut pending: HashMap<u32, SplitAssembler> = HashMap::new();

        loop {
            let len = tokio::time::timeout(self.timeout, self.socket.recv(&mut buf))
                .await
                .map_err(|_| QueryError::Timeout(self.timeout))??;

            match classify(&buf[..len])? {
                Datagram::Single(body) => return Ok(body.to_vec()),
                Datagram::Split { header, payload } => {
                    if !pending.contains_key(&header.id) && pending.len() >= MAX_PENDING_SPLITS {
                        debug!(
                            addr = %self.target,
                            id = header.id,
                            "too many split ids, fragment skipped"
                        );
                        continue;
                    }
                    let asm = pending
                        .entry(header.id)
                        .or_insert_with(|| SplitAssembler::new(&header));
                    if let Some(full) = asm.push(&header, payload)? {
                        return match classify(&full)? {
                            Datagram::Single(body) => Ok(body.to_vec()),
                            Datagram::Split { .. } => Err(QueryError::SplitMismatch(
                                "reassembled message is itself split".to_string(),
                            )),
                        };
                    }
                }
            }
        }
    }
}

impl ProbeSource for A2sClient {
    async fn query_info(&self) -> QueryResult<ServerInfo> {
        self.info().await
    }
}
