//! In-process transport over channels.
//!
//! Lets a host and a client talk inside one process, typically with the
//! host on a spawned thread. Dropping either end closes the other.

use std::sync::mpsc::{Receiver, Sender, channel};

use mcpdemo_core::log_transport;
use mcpdemo_protocol::JsonRpcMessage;

use crate::{Transport, TransportError};

/// One end of an in-memory message pipe.
#[derive(Debug)]
pub struct MemoryTransport {
    tx: Option<Sender<JsonRpcMessage>>,
    rx: Receiver<JsonRpcMessage>,
}

/// Creates two connected transports.
#[must_use]
pub fn memory_pair() -> (MemoryTransport, MemoryTransport) {
    let (a_tx, b_rx) = channel();
    let (b_tx, a_rx) = channel();
    (
        MemoryTransport {
            tx: Some(a_tx),
            rx: a_rx,
        },
        MemoryTransport {
            tx: Some(b_tx),
            rx: b_rx,
        },
    )
}

impl Transport for MemoryTransport {
    fn send(&mut self, message: &JsonRpcMessage) -> Result<(), TransportError> {
        let tx = self.tx.as_ref().ok_or(TransportError::Closed)?;
        tx.send(message.clone()).map_err(|_| TransportError::Closed)
    }

    fn recv(&mut self) -> Result<JsonRpcMessage, TransportError> {
        self.rx.recv().map_err(|_| TransportError::Closed)
    }

    fn close(&mut self) -> Result<(), TransportError> {
        if self.tx.take().is_some() {
            log_transport!("memory transport closed");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mcpdemo_protocol::JsonRpcRequest;

    #[test]
    fn messages_cross_the_pair() {
        let (mut a, mut b) = memory_pair();
        let ping = JsonRpcMessage::Request(JsonRpcRequest::new("ping", None, 1_i64));
        a.send(&ping).unwrap();
        match b.recv().unwrap() {
            JsonRpcMessage::Request(req) => assert_eq!(req.method, "ping"),
            JsonRpcMessage::Response(_) => panic!("expected request"),
        }
    }

    #[test]
    fn closing_one_end_closes_the_other() {
        let (mut a, mut b) = memory_pair();
        a.close().unwrap();
        assert!(b.recv().unwrap_err().is_closed());
        assert!(a.send(&JsonRpcMessage::Request(JsonRpcRequest::notification("x", None))).is_err());
    }
}
