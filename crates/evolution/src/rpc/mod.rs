//! Client for the quant engine's Thrift `EngineService`.
//!
//! Every call opens its own TCP connection with 1 KiB buffered transports and
//! the binary protocol, sends one request and drops the connection when it
//! returns, whatever the outcome. The exchange is blocking; async callers go
//! through [`QuantClient::get_type`], which runs it on the blocking pool.

pub mod engine;

use std::collections::BTreeMap;
use std::net::{SocketAddr, TcpStream, ToSocketAddrs};
use std::time::Duration;

use thiserror::Error;
use thrift::protocol::{TBinaryInputProtocol, TBinaryOutputProtocol};
use thrift::transport::{TBufferedReadTransport, TBufferedWriteTransport, TIoChannel, TTcpChannel};
use tracing::debug;

use crate::config::QuantConfig;
pub use engine::QuantType;

/// Buffer size of the read and write transports.
const TRANSPORT_BUFFER_SIZE: usize = 1024;

/// Socket connect/read/write timeout.
const SOCKET_TIMEOUT: Duration = Duration::from_secs(10);

/// Sequence number of the single call made per connection.
const CALL_SEQUENCE: i32 = 1;

/// Type classification: category name → ordered codes.
pub type QuantTypes = BTreeMap<String, Vec<String>>;

/// Errors talking to the quant engine.
#[derive(Error, Debug)]
pub enum RpcError {
    /// The engine could not be reached
    #[error("cannot connect to quant engine at {addr}: {source}")]
    Connect {
        addr: String,
        #[source]
        source: std::io::Error,
    },

    /// Transport or protocol failure during the exchange
    #[error("thrift error: {0}")]
    Protocol(#[from] thrift::Error),

    /// The engine answered with an application exception
    #[error("quant engine raised: {0}")]
    Remote(String),

    /// The reply did not match the call
    #[error("unexpected reply: {0}")]
    Unexpected(String),

    /// The payload is not a JSON object of string lists
    #[error("invalid type payload: {0}")]
    Decode(#[from] serde_json::Error),

    /// The blocking task did not complete
    #[error("rpc task failed: {0}")]
    Task(String),
}

/// Decode the JSON payload carried by a `GetType` reply.
pub fn decode_types(payload: &str) -> Result<QuantTypes, RpcError> {
    Ok(serde_json::from_str(payload)?)
}

/// Quant engine client.
#[derive(Debug, Clone)]
pub struct QuantClient {
    host: String,
    port: u16,
}

impl QuantClient {
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
        }
    }

    pub fn from_config(config: &QuantConfig) -> Self {
        Self::new(config.host.clone(), config.port)
    }

    /// `host:port` of the engine.
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    fn connect(&self) -> Result<TcpStream, RpcError> {
        let connect_err = |source| RpcError::Connect {
            addr: self.addr(),
            source,
        };
        let addrs: Vec<SocketAddr> = (self.host.as_str(), self.port)
            .to_socket_addrs()
            .map_err(connect_err)?
            .collect();

        let mut last_err = std::io::Error::new(
            std::io::ErrorKind::AddrNotAvailable,
            "host resolved to no addresses",
        );
        for addr in addrs {
            match TcpStream::connect_timeout(&addr, SOCKET_TIMEOUT) {
                Ok(stream) => {
                    stream.set_read_timeout(Some(SOCKET_TIMEOUT)).map_err(connect_err)?;
                    stream.set_write_timeout(Some(SOCKET_TIMEOUT)).map_err(connect_err)?;
                    return Ok(stream);
                }
                Err(e) => last_err = e,
            }
        }
        Err(connect_err(last_err))
    }

    /// Raw `GetType` exchange; returns the reply's data string.
    pub fn call_get_type(&self, kind: QuantType) -> Result<String, RpcError> {
        let stream = self.connect()?;
        let (read_half, write_half) = TTcpChannel::with_stream(stream).split()?;
        let mut input = TBinaryInputProtocol::new(
            TBufferedReadTransport::with_capacity(TRANSPORT_BUFFER_SIZE, read_half),
            false,
        );
        let mut output = TBinaryOutputProtocol::new(
            TBufferedWriteTransport::with_capacity(TRANSPORT_BUFFER_SIZE, write_half),
            true,
        );

        debug!(addr = %self.addr(), ?kind, "Calling GetType");
        engine::write_get_type_call(&mut output, CALL_SEQUENCE, kind)?;
        engine::read_get_type_reply(&mut input, CALL_SEQUENCE)
    }

    /// Stock type classification, blocking.
    pub fn get_type_blocking(&self) -> Result<QuantTypes, RpcError> {
        let payload = self.call_get_type(QuantType::Stock)?;
        decode_types(&payload)
    }

    /// Stock type classification.
    pub async fn get_type(&self) -> Result<QuantTypes, RpcError> {
        let client = self.clone();
        tokio::task::spawn_blocking(move || client.get_type_blocking())
            .await
            .map_err(|e| RpcError::Task(e.to_string()))?
    }
}

/// In-process engine answering `GetType` calls, for tests.
#[cfg(test)]
pub(crate) mod testing {
    use super::engine::{server, QuantType};
    use super::*;
    use std::net::TcpListener;
    use std::thread::JoinHandle;

    /// How the fake engine answers.
    #[derive(Clone)]
    pub enum Answer {
        Data(String),
        Exception(String),
    }

    /// Serve `calls` connections on an ephemeral port; the handle yields the
    /// requested type of each call.
    pub fn spawn_engine(answer: Answer, calls: usize) -> (u16, JoinHandle<Vec<Option<QuantType>>>) {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();
        let handle = std::thread::spawn(move || {
            let mut kinds = Vec::new();
            for _ in 0..calls {
                let (stream, _) = listener.accept().unwrap();
                let (r, w) = TTcpChannel::with_stream(stream).split().unwrap();
                let mut i = TBinaryInputProtocol::new(TBufferedReadTransport::new(r), false);
                let mut o = TBinaryOutputProtocol::new(TBufferedWriteTransport::new(w), true);
                let (seq, kind) = server::read_get_type_call(&mut i).unwrap();
                kinds.push(QuantType::from_i32(kind));
                match &answer {
                    Answer::Data(data) => server::write_get_type_reply(&mut o, seq, data).unwrap(),
                    Answer::Exception(msg) => server::write_exception(&mut o, seq, msg).unwrap(),
                }
            }
            kinds
        });
        (port, handle)
    }
}

#[cfg(test)]
mod tests {
    use super::testing::{spawn_engine, Answer};
    use super::*;

    #[test]
    fn test_decode_types() {
        let types = decode_types(r#"{"STOCK":["GOOG","AAPL"]}"#).unwrap();
        assert_eq!(types.len(), 1);
        assert_eq!(types["STOCK"], vec!["GOOG".to_string(), "AAPL".to_string()]);
    }

    #[test]
    fn test_decode_rejects_non_json() {
        let err = decode_types("not-json").unwrap_err();
        assert!(matches!(err, RpcError::Decode(_)));
    }

    #[test]
    fn test_decode_rejects_wrong_shape() {
        assert!(decode_types(r#"{"STOCK":"GOOG"}"#).is_err());
        assert!(decode_types(r#"["GOOG"]"#).is_err());
    }

    #[test]
    fn test_get_type_round_trip() {
        let (port, engine) = spawn_engine(
            Answer::Data(r#"{"STOCK":["GOOG","AAPL"],"INDEX":["SPX"]}"#.to_string()),
            1,
        );
        let client = QuantClient::new("127.0.0.1", port);

        let types = client.get_type_blocking().unwrap();

        assert_eq!(types["STOCK"], vec!["GOOG", "AAPL"]);
        assert_eq!(types["INDEX"], vec!["SPX"]);
        assert_eq!(engine.join().unwrap(), vec![Some(QuantType::Stock)]);
    }

    #[test]
    fn test_get_type_bad_payload_is_decode_error() {
        let (port, engine) = spawn_engine(Answer::Data("not-json".to_string()), 1);
        let client = QuantClient::new("127.0.0.1", port);

        let err = client.get_type_blocking().unwrap_err();

        assert!(matches!(err, RpcError::Decode(_)));
        engine.join().unwrap();
    }

    #[test]
    fn test_each_call_uses_a_new_connection() {
        let (port, engine) = spawn_engine(Answer::Data("{}".to_string()), 2);
        let client = QuantClient::new("127.0.0.1", port);

        assert!(client.get_type_blocking().unwrap().is_empty());
        assert!(client.get_type_blocking().unwrap().is_empty());
        assert_eq!(engine.join().unwrap().len(), 2);
    }

    #[test]
    fn test_remote_exception() {
        let (port, engine) = spawn_engine(Answer::Exception("engine offline".to_string()), 1);
        let client = QuantClient::new("127.0.0.1", port);

        let err = client.get_type_blocking().unwrap_err();

        assert!(matches!(err, RpcError::Remote(ref msg) if msg == "engine offline"));
        engine.join().unwrap();
    }

    #[test]
    fn test_connect_failure_is_an_error() {
        // Bind then drop to get a port with nothing listening
        let port = std::net::TcpListener::bind("127.0.0.1:0")
            .unwrap()
            .local_addr()
            .unwrap()
            .port();
        let client = QuantClient::new("127.0.0.1", port);

        let err = client.get_type_blocking().unwrap_err();

        assert!(matches!(err, RpcError::Connect { .. }));
        assert!(err.to_string().contains(&format!("127.0.0.1:{}", port)));
    }

    #[tokio::test]
    async fn test_async_get_type() {
        let (port, engine) = spawn_engine(Answer::Data(r#"{"STOCK":["GOOG"]}"#.to_string()), 1);
        let client = QuantClient::new("127.0.0.1", port);

        let types = client.get_type().await.unwrap();

        assert_eq!(types["STOCK"], vec!["GOOG"]);
        engine.join().unwrap();
    }
}
