use std::{
    collections::HashMap,
    pin::Pin,
    sync::{
        atomic::{AtomicBool, AtomicUsize, Ordering},
        Arc, Mutex,
    },
    task::{Context, Poll},
};

use bytes::Bytes;
use futures::{stream, Stream, StreamExt};

use crate::{
    adapters::{self, BackendFuture, ByteChunks},
    model::{
        error::{BackendError, BackendErrorKind},
        listing::{BlobProperties, ListingOptions, ListingSegment},
    },
};

/// In-memory backend with injectable failures and counters.
#[derive(Default)]
pub struct MockClient {
    pub objects: HashMap<String, Vec<Bytes>>,
    pub segments: HashMap<String, ListingSegment>,
    pub endless: Option<String>,
    pub download_error: Option<BackendError>,
    pub list_error: Option<BackendError>,
    pub props_error: Option<BackendError>,
    pub downloads: Arc<AtomicUsize>,
    pub produced: Arc<AtomicUsize>,
    pub body_dropped: Arc<AtomicBool>,
    pub last_options: Mutex<Option<ListingOptions>>,
}

impl MockClient {
    pub fn with_object(mut self, key: &str, chunks: &[&str]) -> Self {
        let chunks = chunks
            .iter()
            .map(|chunk| Bytes::from(chunk.to_string()))
            .collect();
        self.objects.insert(key.to_string(), chunks);
        self
    }

    /// Registers an object whose body never ends.
    pub fn with_endless_object(mut self, key: &str) -> Self {
        self.endless = Some(key.to_string());
        self
    }

    pub fn with_segment(mut self, prefix: &str, items: &[&str], prefixes: &[&str]) -> Self {
        self.segments.insert(
            prefix.to_string(),
            ListingSegment {
                items: items.iter().map(|s| s.to_string()).collect(),
                prefixes: prefixes.iter().map(|s| s.to_string()).collect(),
            },
        );
        self
    }

    pub fn with_download_error(mut self, kind: BackendErrorKind) -> Self {
        self.download_error = Some(BackendError::new(kind, "download failed"));
        self
    }

    pub fn with_list_error(mut self, kind: BackendErrorKind, message: &str) -> Self {
        self.list_error = Some(BackendError::new(kind, message));
        self
    }

    pub fn with_props_error(mut self, kind: BackendErrorKind) -> Self {
        self.props_error = Some(BackendError::new(kind, "get_properties failed"));
        self
    }

    pub fn last_options(&self) -> Option<ListingOptions> {
        self.last_options.lock().unwrap().clone()
    }
}

/// Counts every chunk handed out and flags when the body is dropped.
struct ObservedBody {
    inner: ByteChunks,
    produced: Arc<AtomicUsize>,
    dropped: Arc<AtomicBool>,
}

impl Stream for ObservedBody {
    type Item = Result<Bytes, BackendError>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let this = self.get_mut();
        let polled = this.inner.as_mut().poll_next(cx);
        if let Poll::Ready(Some(_)) = &polled {
            this.produced.fetch_add(1, Ordering::SeqCst);
        }
        polled
    }
}

impl Drop for ObservedBody {
    fn drop(&mut self) {
        self.dropped.store(true, Ordering::SeqCst);
    }
}

impl adapters::Downloader for MockClient {
    fn download<'a>(&'a self, key: &'a str) -> BackendFuture<'a, ByteChunks> {
        Box::pin(async move {
            self.downloads.fetch_add(1, Ordering::SeqCst);

            if let Some(err) = &self.download_error {
                return Err(err.clone());
            }

            let inner: ByteChunks = if self.endless.as_deref() == Some(key) {
                stream::repeat_with(|| Ok(Bytes::from_static(b"chunk"))).boxed()
            } else {
                match self.objects.get(key) {
                    Some(chunks) => stream::iter(chunks.clone().into_iter().map(Ok)).boxed(),
                    None => {
                        return Err(BackendError::new(
                            BackendErrorKind::NotFound,
                            format!("no such key: {}", key),
                        ))
                    }
                }
            };

            let body: ByteChunks = Box::pin(ObservedBody {
                inner,
                produced: Arc::clone(&self.produced),
                dropped: Arc::clone(&self.body_dropped),
            });

            Ok(body)
        })
    }
}

impl adapters::HierarchyLister for MockClient {
    fn list_hierarchy<'a>(
        &'a self,
        options: &'a ListingOptions,
    ) -> BackendFuture<'a, Option<ListingSegment>> {
        Box::pin(async move {
            *self.last_options.lock().unwrap() = Some(options.clone());

            if let Some(err) = &self.list_error {
                return Err(err.clone());
            }

            Ok(self.segments.get(&options.prefix).cloned())
        })
    }
}

impl adapters::PropertiesFetcher for MockClient {
    fn get_properties<'a>(&'a self, key: &'a str) -> BackendFuture<'a, BlobProperties> {
        Box::pin(async move {
            if let Some(err) = &self.props_error {
                return Err(err.clone());
            }

            match self.objects.get(key) {
                Some(chunks) => Ok(BlobProperties {
                    content_length: chunks.iter().map(|c| c.len() as u64).sum(),
                    content_type: Some("application/json".to_string()),
                }),
                None => Err(BackendError::new(
                    BackendErrorKind::NotFound,
                    format!("no such key: {}", key),
                )),
            }
        })
    }
}
