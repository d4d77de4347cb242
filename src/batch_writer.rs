//! Auto-batching writer for BatchWriteItem.

use std::time::Duration;

use aws_sdk_dynamodb::types::{DeleteRequest, PutRequest, WriteRequest};
use tracing::{debug, warn};

use crate::backend::DynamoApi;
use crate::errors::{Error, Result};
use crate::item::{AttributeMap, Item};

/// Maximum number of requests DynamoDB accepts in one BatchWriteItem call.
pub const MAX_BATCH_WRITE_ITEMS: usize = 25;

/// Resends allowed in a row while DynamoDB keeps returning unprocessed requests.
pub const DEFAULT_MAX_RETRIES: u32 = 8;

/// Delay before the first resend. Doubles on each further resend.
pub const DEFAULT_BASE_DELAY: Duration = Duration::from_millis(50);

const MAX_DELAY: Duration = Duration::from_secs(5);

/// Buffers put and delete requests for one table and sends them in batches
/// of [`MAX_BATCH_WRITE_ITEMS`].
///
/// Requests DynamoDB reports as unprocessed go back into the buffer and are
/// sent again with the next batch, after an exponential backoff. Once
/// `max_retries` batches in a row come back with unprocessed requests the
/// writer gives up with [`Error::Throttling`]. Call [`BatchWriter::finish`]
/// to drain the buffer; dropping the writer discards whatever is still
/// buffered.
pub struct BatchWriter<'a, C: DynamoApi + ?Sized> {
    client: &'a C,
    table_name: String,
    buffer: Vec<WriteRequest>,
    written: usize,
    max_retries: u32,
    base_delay: Duration,
    retries: u32,
}

impl<'a, C: DynamoApi + ?Sized> BatchWriter<'a, C> {
    pub fn new(client: &'a C, table_name: impl Into<String>) -> Self {
        BatchWriter {
            client,
            table_name: table_name.into(),
            buffer: Vec::new(),
            written: 0,
            max_retries: DEFAULT_MAX_RETRIES,
            base_delay: DEFAULT_BASE_DELAY,
            retries: 0,
        }
    }

    /// Override the resend limit and the first backoff delay.
    pub fn with_retry(mut self, max_retries: u32, base_delay: Duration) -> Self {
        self.max_retries = max_retries;
        self.base_delay = base_delay;
        self
    }

    /// Queue a delete for the item with the given wire-format key.
    pub async fn delete_item(&mut self, key: AttributeMap) -> Result<()> {
        let delete = DeleteRequest::builder()
            .set_key(Some(key))
            .build()
            .map_err(|e| Error::Validation(format!("Invalid delete request: {}", e)))?;
        self.push(WriteRequest::builder().delete_request(delete).build())
            .await
    }

    /// Queue a put for `item`.
    pub async fn put_item(&mut self, item: &Item) -> Result<()> {
        let put = PutRequest::builder()
            .set_item(Some(item.to_attribute_map()))
            .build()
            .map_err(|e| Error::Validation(format!("Invalid put request: {}", e)))?;
        self.push(WriteRequest::builder().put_request(put).build())
            .await
    }

    /// Number of requests DynamoDB has confirmed so far.
    pub fn written(&self) -> usize {
        self.written
    }

    pub fn pending(&self) -> usize {
        self.buffer.len()
    }

    async fn push(&mut self, request: WriteRequest) -> Result<()> {
        self.buffer.push(request);
        if self.buffer.len() >= MAX_BATCH_WRITE_ITEMS {
            self.flush().await?;
        }
        Ok(())
    }

    /// Send one batch from the front of the buffer. Unprocessed requests are
    /// requeued and the call sleeps out the backoff before returning.
    pub async fn flush(&mut self) -> Result<()> {
        if self.buffer.is_empty() {
            return Ok(());
        }

        let take = self.buffer.len().min(MAX_BATCH_WRITE_ITEMS);
        let batch: Vec<WriteRequest> = self.buffer.drain(..take).collect();
        let sent = batch.len();

        let unprocessed = self.client.batch_write(&self.table_name, batch).await?;
        self.written += sent.saturating_sub(unprocessed.len());

        if unprocessed.is_empty() {
            self.retries = 0;
            return Ok(());
        }

        let left = unprocessed.len();
        self.buffer.extend(unprocessed);
        if self.retries >= self.max_retries {
            warn!(
                table = %self.table_name,
                unprocessed = left,
                retries = self.retries,
                "giving up on unprocessed write requests"
            );
            return Err(Error::Throttling(format!(
                "{} write requests still unprocessed after {} retries",
                left, self.retries
            )));
        }

        let delay = self.backoff();
        self.retries += 1;
        debug!(
            table = %self.table_name,
            unprocessed = left,
            retry = self.retries,
            delay_ms = delay.as_millis() as u64,
            "requeueing unprocessed write requests"
        );
        tokio::time::sleep(delay).await;
        Ok(())
    }

    fn backoff(&self) -> Duration {
        self.base_delay
            .checked_mul(1u32 << self.retries.min(16))
            .map_or(MAX_DELAY, |d| d.min(MAX_DELAY))
    }

    /// Flush until the buffer is empty and return the number of requests
    /// written over the writer's lifetime.
    pub async fn finish(mut self) -> Result<usize> {
        while !self.buffer.is_empty() {
            self.flush().await?;
        }
        Ok(self.written)
    }
}
