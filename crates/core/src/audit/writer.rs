use std::sync::Arc;

use tokio::sync::mpsc;

use super::{AuditEventEnvelope, AuditHandle, AuditRecord, AuditStore};

impl From<AuditEventEnvelope> for AuditRecord {
    fn from(envelope: AuditEventEnvelope) -> Self {
        Self {
            id: 0,
            timestamp: envelope.timestamp,
            event_type: envelope.event.event_type().to_string(),
            match_id: envelope.event.match_id().map(String::from),
            data: envelope.event,
        }
    }
}

/// Background task that drains the audit channel into storage.
///
/// Events are written one at a time in the order they were queued, so a
/// match trail reads back in scoring order.
pub struct AuditWriter {
    rx: mpsc::Receiver<AuditEventEnvelope>,
    store: Arc<dyn AuditStore>,
}

impl AuditWriter {
    pub fn new(rx: mpsc::Receiver<AuditEventEnvelope>, store: Arc<dyn AuditStore>) -> Self {
        Self { rx, store }
    }

    /// Consume events until every handle has been dropped.
    ///
    /// Spawn with `tokio::spawn(writer.run())`.
    pub async fn run(mut self) {
        tracing::info!("Audit writer started");
        let (mut written, mut failed) = (0u64, 0u64);

        while let Some(envelope) = self.rx.recv().await {
            let record = AuditRecord::from(envelope);
            match self.store.insert(&record) {
                Ok(_) => written += 1,
                Err(e) => {
                    failed += 1;
                    tracing::error!(
                        event_type = %record.event_type,
                        match_id = ?record.match_id,
                        "Failed to write audit event: {}",
                        e
                    );
                }
            }
        }

        tracing::info!(written, failed, "Audit writer shutting down");
    }
}

/// Create the emitting handle and the writer that persists its events.
///
/// `buffer_size` bounds the channel; `emit` waits when it is full.
pub fn create_audit_system(
    store: Arc<dyn AuditStore>,
    buffer_size: usize,
) -> (AuditHandle, AuditWriter) {
    let (tx, rx) = mpsc::channel(buffer_size);
    let handle = AuditHandle::new(tx);
    let writer = AuditWriter::new(rx, store);
    (handle, writer)
}
