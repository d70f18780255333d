use std::{
    num::NonZeroUsize,
    pin::Pin,
    sync::Arc,
    task::{Context, Poll},
};

use bytes::Bytes;
use futures::{stream, Stream, StreamExt};
use tokio::{sync::mpsc, task::JoinHandle};
use tracing::{debug, warn, Instrument, Span};

use crate::{
    adapters::Downloader,
    model::{
        error::{BackendError, BlobstoreError},
        path::BlobPath,
    },
    util::path::to_object_key,
};

pub type BlobStream = Pin<Box<dyn Stream<Item = Result<Bytes, BlobstoreError>> + Send>>;

pub struct GetService<C> {
    client: Arc<C>,
    max_queue_size: NonZeroUsize,
}

impl<C: Downloader + 'static> GetService<C> {
    pub fn new(client: Arc<C>, max_queue_size: NonZeroUsize) -> Self {
        Self {
            client,
            max_queue_size,
        }
    }

    /// Cold stream over the blob's bytes. Nothing is requested until the first poll,
    /// after which a reader task fills a queue of at most `max_queue_size` chunks.
    /// Dropping the stream stops the reader, which logs under the caller's span.
    pub fn get(&self, path: &BlobPath) -> BlobStream {
        let client = Arc::clone(&self.client);
        let capacity = self.max_queue_size.get();
        let path = path.clone();
        let span = Span::current();

        stream::once(async move {
            let (tx, rx) = mpsc::channel(capacity);
            let reader = tokio::spawn(read_blob(client, path, tx).instrument(span));
            QueuedChunks { rx, reader }
        })
        .flatten()
        .boxed()
    }
}

async fn read_blob<C: Downloader>(
    client: Arc<C>,
    path: BlobPath,
    tx: mpsc::Sender<Result<Bytes, BlobstoreError>>,
) {
    let key = to_object_key(&path);
    debug!(key = %key, "download started");

    let mut chunks = match client.download(&key).await {
        Ok(chunks) => chunks,
        Err(err) => {
            warn!(error_message=%err, error_group="download", key = %key);
            let _ = tx.send(Err(download_error(err, &path))).await;
            return;
        }
    };

    while let Some(chunk) = chunks.next().await {
        let failed = chunk.is_err();
        if tx
            .send(chunk.map_err(|err| download_error(err, &path)))
            .await
            .is_err()
        {
            debug!(key = %key, "consumer went away");
            return;
        }

        if failed {
            return;
        }
    }

    debug!(key = %key, "download finished");
}

fn download_error(err: BackendError, path: &BlobPath) -> BlobstoreError {
    if err.is_not_found() {
        BlobstoreError::PathNotFound(path.clone())
    } else {
        BlobstoreError::Transport(err)
    }
}

struct QueuedChunks {
    rx: mpsc::Receiver<Result<Bytes, BlobstoreError>>,
    reader: JoinHandle<()>,
}

impl Stream for QueuedChunks {
    type Item = Result<Bytes, BlobstoreError>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.get_mut().rx.poll_recv(cx)
    }
}

impl Drop for QueuedChunks {
    fn drop(&mut self) {
        self.reader.abort();
    }
}
