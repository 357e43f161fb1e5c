//! Typed operations against the archive backend.

use std::sync::Arc;

use manka_core::{HttpClient, HttpClientExt, HttpError, RequestConfig, config::join_url};
use manka_session::AuthSession;
use serde_json::Value;

use crate::{
    protocol::{
        Favorite, FavoriteCreated, ImgSpec, LoginRequest, MankaArchive, NewFavorite,
        NewSearchGroup, Page, SearchGroup, SearchQuery,
    },
    selector,
};

/// Backend API over the shared transport.
#[derive(Clone)]
pub struct MankaApi {
    client: Arc<dyn HttpClient>,
    session: Arc<AuthSession>,
}

impl MankaApi {
    /// Create the API over an explicit client.
    #[must_use]
    pub fn new(client: Arc<dyn HttpClient>, session: Arc<AuthSession>) -> Self {
        Self { client, session }
    }

    /// Create the API over the installed shared client.
    ///
    /// # Errors
    /// Returns `HttpError::NotInitialized` before the client is installed.
    pub fn from_installed(session: Arc<AuthSession>) -> Result<Self, HttpError> {
        Ok(Self::new(selector::http_client()?, session))
    }

    /// Session this API signs in and out of.
    #[must_use]
    pub fn session(&self) -> &AuthSession {
        &self.session
    }

    /// Log in; the session becomes authenticated only if the backend accepts.
    ///
    /// # Errors
    /// Any transport or envelope failure.
    pub async fn login(&self, user_name: &str, password: &str) -> Result<(), HttpError> {
        let request = LoginRequest {
            user_name: user_name.to_string(),
            password: password.to_string(),
        };
        let _: Value = self.client.post_json("/user/login", &request).await?;
        self.session.sign_in();
        Ok(())
    }

    /// Forget the local login.
    pub fn logout(&self) {
        self.session.sign_out();
    }

    /// Archive detail, including its images and tags.
    ///
    /// # Errors
    /// Any transport or envelope failure.
    pub async fn archive_detail(&self, archive_id: &str) -> Result<MankaArchive, HttpError> {
        self.client
            .get_data(&format!("/manka/{archive_id}/detail"))
            .await
    }

    /// Search the archive collection.
    ///
    /// # Errors
    /// Any transport or envelope failure.
    pub async fn search(&self, query: &SearchQuery) -> Result<Page<MankaArchive>, HttpError> {
        self.client.post_json("/manka/search", query).await
    }

    /// Record reading progress.
    ///
    /// # Errors
    /// Any transport or envelope failure.
    pub async fn log_read_progress(&self, archive_id: &str, page: u32) -> Result<(), HttpError> {
        let _: Value = self
            .client
            .get_data(&format!("/manka/{archive_id}/log/{page}"))
            .await?;
        Ok(())
    }

    /// Absolute URL of one image rendition.
    #[must_use]
    pub fn image_link(&self, archive_id: &str, item_index: u32, spec: ImgSpec) -> String {
        join_url(
            self.client.base_url(),
            &format!("/manka/{archive_id}/{item_index}/{}/link", spec.as_str()),
        )
    }

    /// Saved searches.
    ///
    /// # Errors
    /// Any transport or envelope failure.
    pub async fn search_groups(&self) -> Result<Vec<SearchGroup>, HttpError> {
        self.client.get_data("/searchGroup/list").await
    }

    /// Save a search.
    ///
    /// # Errors
    /// Any transport or envelope failure.
    pub async fn add_search_group(&self, name: &str, query: &str) -> Result<(), HttpError> {
        let body = NewSearchGroup {
            search_group_name: name.to_string(),
            search_query: query.to_string(),
        };
        let _: Value = self.client.post_json("/searchGroup/add", &body).await?;
        Ok(())
    }

    /// Delete a saved search.
    ///
    /// # Errors
    /// Any transport or envelope failure.
    pub async fn remove_search_group(&self, search_group_id: &str) -> Result<(), HttpError> {
        let _: Value = self
            .client
            .get_data(&format!("/searchGroup/remove/{search_group_id}"))
            .await?;
        Ok(())
    }

    /// Favorites, as served for `page`.
    ///
    /// # Errors
    /// Any transport or envelope failure.
    pub async fn favorites(&self, page: u32) -> Result<Vec<Favorite>, HttpError> {
        let config = RequestConfig::new().query("page", page);
        Ok(self
            .client
            .get::<Vec<Favorite>>("/favorite/list", Some(config))
            .await?
            .into_data())
    }

    /// Add an archive to the favorites.
    ///
    /// # Errors
    /// Any transport or envelope failure.
    pub async fn add_favorite(&self, archive_id: &str) -> Result<FavoriteCreated, HttpError> {
        let body = NewFavorite {
            archive_id: archive_id.to_string(),
        };
        let created: FavoriteCreated = self.client.post_json("/favorite/add", &body).await?;
        if created.favorite_id.is_empty() {
            tracing::warn!(archive_id, "backend returned no favorite id");
        }
        Ok(created)
    }

    /// Remove a favorite.
    ///
    /// # Errors
    /// Any transport or envelope failure.
    pub async fn remove_favorite(&self, favorite_id: &str) -> Result<(), HttpError> {
        let _: Value = self
            .client
            .get_data(&format!("/favorite/remove/{favorite_id}"))
            .await?;
        Ok(())
    }
}

impl std::fmt::Debug for MankaApi {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MankaApi")
            .field("target", &self.client.target())
            .field("base_url", &self.client.base_url())
            .field("session", &self.session)
            .finish()
    }
}
