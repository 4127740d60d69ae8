//! TCP connection factory for the registry session

use crate::codec::{decode_record, encode_record};
use crate::TransportError;
use async_trait::async_trait;
use registry_api::Record;
use registry_core::{Connection, ConnectionFactory, Link};
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::TcpStream;
use tokio::sync::{mpsc, Mutex};
use tracing::{debug, info, warn};

/// Where and how to reach the registry
#[derive(Clone, Debug)]
pub struct TcpConnectorConfig {
    pub host: String,
    pub port: u16,
    /// Upper bound on establishing the TCP connection
    pub connect_timeout: Duration,
    /// Decoded records buffered ahead of the session
    pub channel_capacity: usize,
}

impl Default for TcpConnectorConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 4500,
            connect_timeout: Duration::from_secs(10),
            channel_capacity: 256,
        }
    }
}

impl TcpConnectorConfig {
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Opens newline-delimited JSON connections to the registry.
///
/// Reconnect and backoff are left to the caller: each `connect` makes one
/// attempt.
pub struct JsonLineConnector {
    config: TcpConnectorConfig,
}

impl JsonLineConnector {
    pub fn new(config: TcpConnectorConfig) -> Self {
        Self { config }
    }

    async fn open(&self) -> Result<Link, TransportError> {
        let addr = self.config.addr();
        let attempt =
            tokio::time::timeout(self.config.connect_timeout, TcpStream::connect(addr.as_str()))
                .await;
        let stream = match attempt {
            Ok(Ok(stream)) => stream,
            Ok(Err(source)) => return Err(TransportError::Connect { addr, source }),
            Err(_) => {
                return Err(TransportError::ConnectTimeout {
                    addr,
                    timeout: self.config.connect_timeout,
                })
            }
        };
        stream.set_nodelay(true)?;
        info!(addr = %addr, "Registry connection established");

        let (read_half, write_half) = stream.into_split();
        let (tx, rx) = mpsc::channel(self.config.channel_capacity);
        tokio::spawn(read_records(read_half, tx, addr));

        let connection = Arc::new(JsonLineConnection {
            writer: Mutex::new(write_half),
        });
        Ok(Link::new(connection, rx))
    }
}

#[async_trait]
impl ConnectionFactory for JsonLineConnector {
    async fn connect(&self) -> registry_core::Result<Link> {
        Ok(self.open().await?)
    }
}

/// Outbound half of a registry connection
pub struct JsonLineConnection {
    writer: Mutex<OwnedWriteHalf>,
}

impl JsonLineConnection {
    async fn write_record(&self, record: &Record) -> Result<(), TransportError> {
        let line = encode_record(record)?;
        let mut writer = self.writer.lock().await;
        writer.write_all(&line).await?;
        writer.flush().await?;
        Ok(())
    }
}

#[async_trait]
impl Connection for JsonLineConnection {
    async fn send(&self, record: Record) -> registry_core::Result<()> {
        self.write_record(&record).await?;
        debug!(kind = %record.kind, pid = ?record.pid, "Sent record");
        Ok(())
    }
}

/// Decode lines until EOF, forwarding each record to the session.
/// Lines that fail to decode are skipped.
async fn read_records(read_half: OwnedReadHalf, tx: mpsc::Sender<Record>, addr: String) {
    let mut lines = BufReader::new(read_half).lines();
    loop {
        match lines.next_line().await {
            Ok(Some(line)) => {
                if line.trim().is_empty() {
                    continue;
                }
                match decode_record(&line) {
                    Ok(record) => {
                        debug!(kind = %record.kind, "Received record");
                        if tx.send(record).await.is_err() {
                            debug!("Session dropped its inbound channel");
                            break;
                        }
                    }
                    Err(e) => warn!(addr = %addr, "Skipping undecodable line: {}", e),
                }
            }
            Ok(None) => {
                info!(addr = %addr, "Registry closed the connection");
                break;
            }
            Err(e) => {
                warn!(addr = %addr, "Registry read failed: {}", e);
                break;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tokio::net::TcpListener;

    async fn listener() -> (TcpListener, TcpConnectorConfig) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        let config = TcpConnectorConfig {
            port,
            ..Default::default()
        };
        (listener, config)
    }

    #[test]
    fn test_default_config() {
        let config = TcpConnectorConfig::default();
        assert_eq!(config.addr(), "127.0.0.1:4500");
        assert_eq!(config.connect_timeout, Duration::from_secs(10));
        assert_eq!(config.channel_capacity, 256);
    }

    #[tokio::test]
    async fn test_send_writes_one_line_per_record() {
        let (listener, config) = listener().await;
        let server = tokio::spawn(async move {
            let (stream, _) = listener.accept().await.unwrap();
            let mut lines = BufReader::new(stream).lines();
            let first = lines.next_line().await.unwrap().unwrap();
            let second = lines.next_line().await.unwrap().unwrap();
            (first, second)
        });

        let link = JsonLineConnector::new(config).connect().await.unwrap();
        link.connection
            .send(Record::new("register", &json!({"app": "orders"})).unwrap().with_pid("p1"))
            .await
            .unwrap();
        link.connection
            .send(Record::new("subscribe", &json!({"ip": "10.0.0.5"})).unwrap())
            .await
            .unwrap();

        let (first, second) = server.await.unwrap();
        assert_eq!(decode_record(&first).unwrap().pid.as_deref(), Some("p1"));
        assert!(decode_record(&second).unwrap().is("subscribe"));
    }

    #[tokio::test]
    async fn test_inbound_lines_become_records() {
        let (listener, config) = listener().await;
        let server = tokio::spawn(async move {
            let (mut stream, _) = listener.accept().await.unwrap();
            stream
                .write_all(b"garbage\n\n{\"type\":\"registered\",\"params\":{\"vendors\":[]}}\n")
                .await
                .unwrap();
            stream.shutdown().await.unwrap();
        });

        let mut link = JsonLineConnector::new(config).connect().await.unwrap();
        let record = link.inbound.recv().await.unwrap();
        assert!(record.is("registered"));

        server.await.unwrap();
        assert!(link.inbound.recv().await.is_none());
    }

    #[tokio::test]
    async fn test_connect_refused() {
        let (listener, config) = listener().await;
        drop(listener);

        let result = JsonLineConnector::new(config).connect().await;
        assert!(matches!(
            result,
            Err(registry_core::CoreError::Transport(_))
        ));
    }
}
