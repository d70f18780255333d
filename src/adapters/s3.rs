use aws_sdk_s3::error::SdkError;
use futures::{stream, StreamExt, TryStreamExt};

use crate::{
    adapters::{self, BackendFuture, ByteChunks},
    model::{
        error::{BackendError, BackendErrorKind},
        listing::{BlobProperties, ListingOptions, ListingSegment},
    },
};

/// AWS S3 bucket. S3 always answers a listing, so a segment is always returned.
pub struct S3Bucket {
    client: aws_sdk_s3::Client,
    bucket: String,
}

impl S3Bucket {
    pub fn new(client: aws_sdk_s3::Client, bucket: impl Into<String>) -> Self {
        Self {
            client,
            bucket: bucket.into(),
        }
    }
}

fn backend_error<E>(err: &SdkError<E>, message: String) -> BackendError {
    let kind = match err {
        SdkError::DispatchFailure(_) | SdkError::TimeoutError(_) => BackendErrorKind::Unavailable,
        _ => err
            .raw_response()
            .map(|response| BackendError::kind_for_status(response.status().as_u16()))
            .unwrap_or(BackendErrorKind::Other),
    };

    BackendError::new(kind, format!("{}, {}", message, err))
}

impl adapters::Downloader for S3Bucket {
    fn download<'a>(&'a self, key: &'a str) -> BackendFuture<'a, ByteChunks> {
        Box::pin(async move {
            let o = self
                .client
                .get_object()
                .bucket(&self.bucket)
                .key(key)
                .send()
                .await
                .map_err(|err| backend_error(&err, format!("failed to get_object: {}", key)))?;

            let key = key.to_string();
            let chunks = stream::unfold(o.body, |mut body| async move {
                body.next().await.map(|chunk| (chunk, body))
            })
            .map_err(move |err| {
                BackendError::new(
                    BackendErrorKind::Other,
                    format!("failed to read body: {}, {}", key, err),
                )
            })
            .boxed();

            Ok(chunks)
        })
    }
}

impl adapters::HierarchyLister for S3Bucket {
    fn list_hierarchy<'a>(
        &'a self,
        options: &'a ListingOptions,
    ) -> BackendFuture<'a, Option<ListingSegment>> {
        Box::pin(async move {
            let max_keys = i32::try_from(options.max_results.get()).unwrap_or(i32::MAX);

            let lo = self
                .client
                .list_objects_v2()
                .bucket(&self.bucket)
                .prefix(&options.prefix)
                .delimiter(options.delimiter.to_string())
                .max_keys(max_keys)
                .send()
                .await
                .map_err(|err| {
                    backend_error(
                        &err,
                        format!("failed to list_objects at: {}", options.prefix),
                    )
                })?;

            Ok(Some(ListingSegment {
                items: lo
                    .contents()
                    .iter()
                    .filter_map(|o| o.key())
                    .map(str::to_string)
                    .collect(),
                prefixes: lo
                    .common_prefixes()
                    .iter()
                    .filter_map(|p| p.prefix())
                    .map(str::to_string)
                    .collect(),
            }))
        })
    }
}

impl adapters::PropertiesFetcher for S3Bucket {
    fn get_properties<'a>(&'a self, key: &'a str) -> BackendFuture<'a, BlobProperties> {
        Box::pin(async move {
            let ho = self
                .client
                .head_object()
                .bucket(&self.bucket)
                .key(key)
                .send()
                .await
                .map_err(|err| backend_error(&err, format!("failed to head_object: {}", key)))?;

            Ok(BlobProperties {
                content_length: ho.content_length().unwrap_or(0).max(0) as u64,
                content_type: ho.content_type().map(str::to_string),
            })
        })
    }
}
