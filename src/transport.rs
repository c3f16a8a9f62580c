// Divesim - Dive-site telemetry engine
// Copyright (c) 2025 David Martin Venti
//
// Dual-licensed under AGPL-3.0 and Commercial License.
// See LICENSE file for details.

//! Transport abstraction module
//!
//! Publishing is fire-and-forget: a transport takes a topic and a payload
//! and either accepts it or reports an error. It never waits for an
//! acknowledgment and never retries.

use crate::error::TransportError;
use serde::Serialize;
use std::collections::VecDeque;
use std::io::Write;

/// Statistics about transport usage
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TransportMetrics {
    /// Total payload bytes accepted
    pub bytes_sent: u64,
    /// Total messages accepted
    pub messages_sent: u64,
    /// Publish calls that failed
    pub failures: u64,
}

/// A message handed to a transport
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    pub topic: String,
    pub payload: Vec<u8>,
}

impl Message {
    /// Payload as UTF-8 text, if it is
    pub fn payload_str(&self) -> Option<&str> {
        std::str::from_utf8(&self.payload).ok()
    }
}

/// Trait for publishing transports
pub trait Transport {
    /// Publish a payload on a topic
    fn publish(&mut self, topic: &str, payload: &[u8]) -> Result<(), TransportError>;

    /// Check if the transport accepts messages
    fn is_available(&self) -> bool;

    /// Get transport metrics
    fn metrics(&self) -> TransportMetrics;

    /// Close the transport
    fn close(&mut self);

    /// Serialize a value as JSON and publish it
    fn publish_json<T: Serialize + ?Sized>(
        &mut self,
        topic: &str,
        value: &T,
    ) -> Result<(), TransportError>
    where
        Self: Sized,
    {
        let payload = serde_json::to_vec(value)?;
        self.publish(topic, &payload)
    }
}

impl<T: Transport + ?Sized> Transport for Box<T> {
    fn publish(&mut self, topic: &str, payload: &[u8]) -> Result<(), TransportError> {
        (**self).publish(topic, payload)
    }

    fn is_available(&self) -> bool {
        (**self).is_available()
    }

    fn metrics(&self) -> TransportMetrics {
        (**self).metrics()
    }

    fn close(&mut self) {
        (**self).close()
    }
}

/// A bounded in-memory transport for testing and local inspection
#[derive(Debug)]
pub struct MemoryTransport {
    outbox: VecDeque<Message>,
    max_buffer_size: usize,
    is_open: bool,
    metrics: TransportMetrics,
}

impl MemoryTransport {
    /// Create a new memory transport
    pub fn new() -> Self {
        Self::with_buffer_size(10_000)
    }

    /// Create with custom buffer size
    pub fn with_buffer_size(max_size: usize) -> Self {
        Self {
            outbox: VecDeque::new(),
            max_buffer_size: max_size,
            is_open: true,
            metrics: TransportMetrics::default(),
        }
    }

    /// Pop the oldest published message
    pub fn pop(&mut self) -> Option<Message> {
        self.outbox.pop_front()
    }

    /// Take every published message
    pub fn drain(&mut self) -> Vec<Message> {
        self.outbox.drain(..).collect()
    }

    /// Published messages still held
    pub fn messages(&self) -> impl Iterator<Item = &Message> {
        self.outbox.iter()
    }

    /// Number of held messages
    pub fn pending(&self) -> usize {
        self.outbox.len()
    }
}

impl Default for MemoryTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl Transport for MemoryTransport {
    fn publish(&mut self, topic: &str, payload: &[u8]) -> Result<(), TransportError> {
        if !self.is_open {
            self.metrics.failures += 1;
            return Err(TransportError::Closed);
        }
        if self.outbox.len() >= self.max_buffer_size {
            self.metrics.failures += 1;
            return Err(TransportError::BufferFull {
                capacity: self.max_buffer_size,
            });
        }

        self.outbox.push_back(Message {
            topic: topic.to_string(),
            payload: payload.to_vec(),
        });
        self.metrics.bytes_sent += payload.len() as u64;
        self.metrics.messages_sent += 1;
        Ok(())
    }

    fn is_available(&self) -> bool {
        self.is_open
    }

    fn metrics(&self) -> TransportMetrics {
        self.metrics.clone()
    }

    fn close(&mut self) {
        self.is_open = false;
    }
}

#[derive(Serialize)]
struct Envelope<'a> {
    topic: &'a str,
    payload: &'a serde_json::value::RawValue,
}

/// Writes one JSON line `{"topic": .., "payload": ..}` per message.
///
/// Payloads that are not valid JSON are written as JSON strings.
#[derive(Debug)]
pub struct WriterTransport<W: Write> {
    writer: W,
    is_open: bool,
    metrics: TransportMetrics,
}

impl<W: Write> WriterTransport<W> {
    pub fn new(writer: W) -> Self {
        Self {
            writer,
            is_open: true,
            metrics: TransportMetrics::default(),
        }
    }

    /// Give back the underlying writer
    pub fn into_inner(self) -> W {
        self.writer
    }

    fn write_line(&mut self, topic: &str, payload: &[u8]) -> Result<(), TransportError> {
        let text = String::from_utf8_lossy(payload);
        let raw = match serde_json::from_str::<&serde_json::value::RawValue>(&text) {
            Ok(raw) => raw.to_owned(),
            Err(_) => serde_json::value::to_raw_value(&text)?,
        };
        let line = serde_json::to_string(&Envelope {
            topic,
            payload: &raw,
        })?;
        writeln!(self.writer, "{}", line)?;
        self.writer.flush()?;
        Ok(())
    }
}

impl<W: Write> Transport for WriterTransport<W> {
    fn publish(&mut self, topic: &str, payload: &[u8]) -> Result<(), TransportError> {
        if !self.is_open {
            self.metrics.failures += 1;
            return Err(TransportError::Closed);
        }
        match self.write_line(topic, payload) {
            Ok(()) => {
                self.metrics.bytes_sent += payload.len() as u64;
                self.metrics.messages_sent += 1;
                Ok(())
            }
            Err(e) => {
                self.metrics.failures += 1;
                Err(e)
            }
        }
    }

    fn is_available(&self) -> bool {
        self.is_open
    }

    fn metrics(&self) -> TransportMetrics {
        self.metrics.clone()
    }

    fn close(&mut self) {
        self.is_open = false;
        let _ = self.writer.flush();
    }
}

/// Accepts and discards everything
#[derive(Debug, Default)]
pub struct NullTransport {
    metrics: TransportMetrics,
}

impl NullTransport {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Transport for NullTransport {
    fn publish(&mut self, _topic: &str, payload: &[u8]) -> Result<(), TransportError> {
        self.metrics.bytes_sent += payload.len() as u64;
        self.metrics.messages_sent += 1;
        Ok(())
    }

    fn is_available(&self) -> bool {
        true
    }

    fn metrics(&self) -> TransportMetrics {
        self.metrics.clone()
    }

    fn close(&mut self) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_transport_publish() {
        let mut transport = MemoryTransport::new();
        transport.publish("dive/a/alerts", b"{}").unwrap();
        transport.publish("dive/a/status/battery", b"99.5").unwrap();

        assert_eq!(transport.pending(), 2);
        let first = transport.pop().unwrap();
        assert_eq!(first.topic, "dive/a/alerts");
        assert_eq!(first.payload_str(), Some("{}"));

        let metrics = transport.metrics();
        assert_eq!(metrics.messages_sent, 2);
        assert_eq!(metrics.bytes_sent, 6);
    }

    #[test]
    fn test_memory_transport_buffer_full() {
        let mut transport = MemoryTransport::with_buffer_size(1);
        transport.publish("t", b"1").unwrap();
        let result = transport.publish("t", b"2");
        assert!(matches!(result, Err(TransportError::BufferFull { capacity: 1 })));
        assert_eq!(transport.metrics().failures, 1);
    }

    #[test]
    fn test_memory_transport_closed() {
        let mut transport = MemoryTransport::new();
        transport.close();
        assert!(!transport.is_available());
        assert!(matches!(transport.publish("t", b"1"), Err(TransportError::Closed)));
    }

    #[test]
    fn test_publish_json() {
        let mut transport = MemoryTransport::new();
        transport
            .publish_json("dive/a/sensors/current", &serde_json::json!({"speed": 0.4}))
            .unwrap();
        let msg = transport.pop().unwrap();
        assert_eq!(msg.payload_str(), Some(r#"{"speed":0.4}"#));
    }

    #[test]
    fn test_writer_transport_json_lines() {
        let mut transport = WriterTransport::new(Vec::new());
        transport.publish("dive/a/sensors/temperature", b"17.25").unwrap();
        transport.publish("dive/a/raw", b"not json").unwrap();

        let out = String::from_utf8(transport.into_inner()).unwrap();
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(
            lines[0],
            r#"{"topic":"dive/a/sensors/temperature","payload":17.25}"#
        );
        assert_eq!(lines[1], r#"{"topic":"dive/a/raw","payload":"not json"}"#);
    }

    #[test]
    fn test_boxed_transport() {
        let mut transport: Box<dyn Transport> = Box::new(NullTransport::new());
        transport.publish("t", b"abc").unwrap();
        assert_eq!(transport.metrics().bytes_sent, 3);
    }
}
