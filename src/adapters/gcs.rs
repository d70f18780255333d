use google_cloud_storage::http::objects::{
    download::Range, get::GetObjectRequest, list::ListObjectsRequest,
};
use futures::{StreamExt, TryStreamExt};

use crate::{
    adapters::{self, BackendFuture, ByteChunks},
    model::{
        error::{BackendError, BackendErrorKind},
        listing::{BlobProperties, ListingOptions, ListingSegment},
    },
};

/// Google Cloud Storage bucket. Like S3, every listing call yields a segment.
pub struct GcsBucket {
    client: google_cloud_storage::client::Client,
    bucket: String,
}

impl GcsBucket {
    pub fn new(client: google_cloud_storage::client::Client, bucket: impl Into<String>) -> Self {
        Self {
            client,
            bucket: bucket.into(),
        }
    }

    fn object_request(&self, key: &str) -> GetObjectRequest {
        GetObjectRequest {
            bucket: self.bucket.clone(),
            object: key.to_string(),
            ..Default::default()
        }
    }
}

fn backend_error(err: &google_cloud_storage::http::Error, message: String) -> BackendError {
    BackendError::new(error_kind(err), format!("{}, {}", message, err))
}

fn error_kind(err: &google_cloud_storage::http::Error) -> BackendErrorKind {
    use google_cloud_storage::http::Error;

    match err {
        Error::Response(response) => BackendError::kind_for_status(response.code),
        // DNS, connect and timeout failures never reached the service.
        Error::HttpClient(err) if err.is_connect() || err.is_timeout() || err.is_request() => {
            BackendErrorKind::Unavailable
        }
        _ => BackendErrorKind::Other,
    }
}

impl adapters::Downloader for GcsBucket {
    fn download<'a>(&'a self, key: &'a str) -> BackendFuture<'a, ByteChunks> {
        Box::pin(async move {
            let req = self.object_request(key);

            let body = self
                .client
                .download_streamed_object(&req, &Range::default())
                .await
                .map_err(|err| {
                    backend_error(&err, format!("failed to download_object: {}", key))
                })?;

            let key = key.to_string();
            let chunks = body
                .map_err(move |err| backend_error(&err, format!("failed to read object: {}", key)))
                .boxed();

            Ok(chunks)
        })
    }
}

impl adapters::HierarchyLister for GcsBucket {
    fn list_hierarchy<'a>(
        &'a self,
        options: &'a ListingOptions,
    ) -> BackendFuture<'a, Option<ListingSegment>> {
        Box::pin(async move {
            let req = ListObjectsRequest {
                bucket: self.bucket.clone(),
                prefix: Some(options.prefix.clone()),
                delimiter: Some(options.delimiter.to_string()),
                max_results: Some(i32::try_from(options.max_results.get()).unwrap_or(i32::MAX)),
                ..Default::default()
            };

            let lo = self.client.list_objects(&req).await.map_err(|err| {
                backend_error(
                    &err,
                    format!("failed to list_objects at: {}", options.prefix),
                )
            })?;

            Ok(Some(ListingSegment {
                items: lo
                    .items
                    .unwrap_or_default()
                    .into_iter()
                    .map(|obj| obj.name)
                    .collect(),
                prefixes: lo.prefixes.unwrap_or_default(),
            }))
        })
    }
}

impl adapters::PropertiesFetcher for GcsBucket {
    fn get_properties<'a>(&'a self, key: &'a str) -> BackendFuture<'a, BlobProperties> {
        Box::pin(async move {
            let obj = self
                .client
                .get_object(&self.object_request(key))
                .await
                .map_err(|err| backend_error(&err, format!("failed to get_object: {}", key)))?;

            Ok(BlobProperties {
                content_length: obj.size.max(0) as u64,
                content_type: obj.content_type,
            })
        })
    }
}

#[cfg(test)]
mod tests {
    use google_cloud_storage::http::{error::ErrorResponse, Error};

    use super::*;

    #[test]
    fn test_error_kind_for_response() {
        let cases = vec![
            (404, BackendErrorKind::NotFound),
            (403, BackendErrorKind::AccessDenied),
            (401, BackendErrorKind::AccessDenied),
            (500, BackendErrorKind::Other),
        ];

        for (code, expected) in cases {
            let err = Error::Response(ErrorResponse {
                code,
                errors: vec![],
                message: "response".to_string(),
            });

            assert_eq!(error_kind(&err), expected, "failed for case: {}", code);
        }
    }

    #[tokio::test]
    async fn test_error_kind_for_http_client() {
        // Nothing listens on port 1.
        let refused = reqwest::get("http://127.0.0.1:1/").await.unwrap_err();
        assert_eq!(
            error_kind(&Error::HttpClient(refused)),
            BackendErrorKind::Unavailable
        );

        let malformed = reqwest::Client::new().get("not a url").build().unwrap_err();
        assert_eq!(
            error_kind(&Error::HttpClient(malformed)),
            BackendErrorKind::Other
        );

        let err = Error::InvalidRangeHeader("bytes=x".to_string());
        assert_eq!(
            backend_error(&err, "failed to download_object: a".to_string()).kind,
            BackendErrorKind::Other
        );
    }
}
