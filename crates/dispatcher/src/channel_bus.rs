//! In-process notification bus over a bounded crossbeam channel

use std::time::Duration;

use bytes::Bytes;
use contracts::{BusConnector, ContractError, NotificationSource, Received};
use crossbeam::channel::{self, Receiver, RecvTimeoutError, Sender};

/// Create a bus: a publisher for producers and a one-shot connector for
/// the dispatch loop
pub fn channel_bus(name: impl Into<String>, capacity: usize) -> (NotificationPublisher, ChannelConnector) {
    let name = name.into();
    let (tx, rx) = channel::bounded(capacity);
    (
        NotificationPublisher {
            name: name.clone(),
            tx,
        },
        ChannelConnector { name, rx: Some(rx) },
    )
}

/// Producer side; clone freely
#[derive(Debug, Clone)]
pub struct NotificationPublisher {
    name: String,
    tx: Sender<Bytes>,
}

impl NotificationPublisher {
    /// Queue one encoded notification, blocking while the channel is full
    ///
    /// # Errors
    /// Fails once the subscriber side is gone.
    pub fn publish(&self, payload: Bytes) -> Result<(), ContractError> {
        self.tx
            .send(payload)
            .map_err(|_| ContractError::bus_connection(format!("bus '{}' has no subscriber", self.name)))
    }

    /// Number of notifications waiting to be received
    pub fn pending(&self) -> usize {
        self.tx.len()
    }
}

/// Hands out the receiving end exactly once
#[derive(Debug)]
pub struct ChannelConnector {
    name: String,
    rx: Option<Receiver<Bytes>>,
}

impl BusConnector for ChannelConnector {
    fn connect(&mut self) -> Result<Box<dyn NotificationSource>, ContractError> {
        let rx = self.rx.take().ok_or_else(|| {
            ContractError::bus_connection(format!("bus '{}' already has a subscriber", self.name))
        })?;
        Ok(Box::new(ChannelSource {
            name: self.name.clone(),
            rx,
        }))
    }
}

/// Receiving end owned by the dispatch thread
#[derive(Debug)]
pub struct ChannelSource {
    name: String,
    rx: Receiver<Bytes>,
}

impl NotificationSource for ChannelSource {
    fn name(&self) -> &str {
        &self.name
    }

    fn receive(&mut self, timeout: Duration) -> Result<Received, ContractError> {
        match self.rx.recv_timeout(timeout) {
            Ok(payload) => Ok(Received::Message(payload)),
            Err(RecvTimeoutError::Timeout) => Ok(Received::Timeout),
            Err(RecvTimeoutError::Disconnected) => Ok(Received::Closed),
        }
    }
}
