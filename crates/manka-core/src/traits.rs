//! Core traits for transports and their collaborators.

use async_trait::async_trait;
use serde::{Serialize, de::DeserializeOwned};
use serde_json::Value;

use crate::{
    config::{RequestConfig, RuntimeTarget},
    envelope::Envelope,
    error::{HttpError, StorageError},
};

/// GET/POST capability bound to one runtime environment.
///
/// Implementations return the envelope only once the envelope check has
/// passed; every failure surfaces as an [`HttpError`].
#[async_trait]
pub trait HttpClient: Send + Sync {
    /// Runtime this client was built for.
    fn target(&self) -> RuntimeTarget;

    /// Base URL every path is appended to.
    fn base_url(&self) -> &str;

    /// Issue a GET to `base_url + path`.
    async fn get_value(&self, path: &str, config: RequestConfig)
    -> Result<Envelope<Value>, HttpError>;

    /// Issue a POST to `base_url + path` with an optional JSON body.
    async fn post_value(
        &self,
        path: &str,
        body: Option<Value>,
        config: RequestConfig,
    ) -> Result<Envelope<Value>, HttpError>;
}

/// Typed operations available on every [`HttpClient`].
#[async_trait]
pub trait HttpClientExt: HttpClient {
    /// GET and decode the envelope payload as `T`.
    async fn get<T>(
        &self,
        path: &str,
        config: Option<RequestConfig>,
    ) -> Result<Envelope<T>, HttpError>
    where
        T: DeserializeOwned + Send,
    {
        self.get_value(path, config.unwrap_or_default())
            .await?
            .decode()
    }

    /// POST and decode the envelope payload as `T`.
    async fn post<T>(
        &self,
        path: &str,
        body: Option<Value>,
        config: Option<RequestConfig>,
    ) -> Result<Envelope<T>, HttpError>
    where
        T: DeserializeOwned + Send,
    {
        self.post_value(path, body, config.unwrap_or_default())
            .await?
            .decode()
    }

    /// GET and return only the payload.
    async fn get_data<T>(&self, path: &str) -> Result<T, HttpError>
    where
        T: DeserializeOwned + Send,
    {
        Ok(self.get::<T>(path, None).await?.into_data())
    }

    /// Serialise `body`, POST it and return only the payload.
    async fn post_json<T, B>(&self, path: &str, body: &B) -> Result<T, HttpError>
    where
        T: DeserializeOwned + Send,
        B: Serialize + Sync + ?Sized,
    {
        let body = serde_json::to_value(body).map_err(HttpError::Encode)?;
        Ok(self.post::<T>(path, Some(body), None).await?.into_data())
    }
}

impl<C: HttpClient + ?Sized> HttpClientExt for C {}

/// Full-page navigation primitive.
pub trait Navigator: Send + Sync {
    /// Navigate to `path`, replacing the current view.
    fn redirect(&self, path: &str);
}

/// Local key/value persistence.
///
/// Synchronous so that session reads stay cheap and never touch the network.
pub trait KeyValueStore: Send + Sync {
    /// Read a value.
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Write a value.
    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Delete a value. Deleting a missing key is not an error.
    fn remove(&self, key: &str) -> Result<(), StorageError>;
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use serde::Deserialize;
    use serde_json::json;

    use super::*;
    use crate::envelope::{RawResponse, check_response};

    /// Replays canned responses through the shared check.
    struct CannedClient {
        response: RawResponse,
        seen: Mutex<Vec<(String, Option<Value>)>>,
    }

    #[async_trait]
    impl HttpClient for CannedClient {
        fn target(&self) -> RuntimeTarget {
            RuntimeTarget::Browser
        }

        fn base_url(&self) -> &str {
            "http://canned/api/v1"
        }

        async fn get_value(
            &self,
            path: &str,
            _config: RequestConfig,
        ) -> Result<Envelope<Value>, HttpError> {
            self.seen.lock().unwrap().push((path.to_string(), None));
            check_response(&self.response)
        }

        async fn post_value(
            &self,
            path: &str,
            body: Option<Value>,
            _config: RequestConfig,
        ) -> Result<Envelope<Value>, HttpError> {
            self.seen.lock().unwrap().push((path.to_string(), body));
            check_response(&self.response)
        }
    }

    #[derive(Debug, Deserialize, PartialEq)]
    #[serde(rename_all = "camelCase")]
    struct Created {
        favorite_id: String,
    }

    #[derive(Serialize)]
    #[serde(rename_all = "camelCase")]
    struct AddFavorite<'a> {
        archive_id: &'a str,
    }

    #[test]
    fn test_typed_helpers_through_dyn() {
        let client: Box<dyn HttpClient> = Box::new(CannedClient {
            response: RawResponse::ok_json(&json!({
                "code": 0, "msg": "", "data": {"favoriteId": "f-1"}
            })),
            seen: Mutex::new(Vec::new()),
        });

        let created: Created = tokio_test::block_on(
            client.post_json("/favorite/add", &AddFavorite { archive_id: "123" }),
        )
        .unwrap();
        assert_eq!(created.favorite_id, "f-1");

        let envelope = tokio_test::block_on(client.get::<Created>("/favorite/f-1", None)).unwrap();
        assert_eq!(envelope.code, 0);
    }

    #[tokio::test]
    async fn test_post_json_serialises_body() {
        let client = CannedClient {
            response: RawResponse::ok_json(&json!({"code": 0, "msg": "", "data": null})),
            seen: Mutex::new(Vec::new()),
        };

        let () = client
            .post_json("/favorite/add", &AddFavorite { archive_id: "9" })
            .await
            .unwrap();

        let seen = client.seen.lock().unwrap();
        assert_eq!(seen[0].0, "/favorite/add");
        assert_eq!(seen[0].1, Some(json!({"archiveId": "9"})));
    }

    #[tokio::test]
    async fn test_failure_is_not_decoded() {
        let client = CannedClient {
            response: RawResponse::ok_json(&json!({"code": 42, "msg": "nope", "data": "junk"})),
            seen: Mutex::new(Vec::new()),
        };

        let err = client.get_data::<Created>("/x").await.unwrap_err();
        assert_eq!(err.code(), Some(42));
        assert_eq!(err.message(), Some("nope"));
    }
}
