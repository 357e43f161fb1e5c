//! Wire types exchanged with the archive backend.
//!
//! Field names follow the backend's camelCase JSON. Everything other than
//! identifiers is optional so partial payloads still decode.

use serde::{Deserialize, Serialize};

/// One page of a paged listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    pub page_no: u32,
    pub page_size: u32,
    #[serde(default = "Vec::new")]
    pub page_data: Vec<T>,
    pub page_total: u64,
}

/// Page selector sent with a search.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageQuery {
    pub page_no: u32,
    pub page_size: u32,
}

impl Default for PageQuery {
    fn default() -> Self {
        Self {
            page_no: 1,
            page_size: 25,
        }
    }
}

/// Sortable archive columns.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum RankField {
    #[serde(rename = "archive_name")]
    ArchiveName,
    #[serde(rename = "archive_size")]
    ArchiveSize,
    #[serde(rename = "archive_mod_time")]
    ArchiveModTime,
    #[serde(rename = "created_at")]
    CreatedAt,
    #[default]
    #[serde(rename = "updated_at")]
    UpdatedAt,
    #[serde(rename = "archive_total_page")]
    ArchiveTotalPage,
    #[serde(rename = "last_read_at")]
    LastReadAt,
}

/// One sort criterion. The backend spells the direction flag `Asc`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderBy {
    pub field: RankField,
    #[serde(rename = "Asc")]
    pub asc: bool,
}

/// Body of `POST /manka/search`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchQuery {
    pub query: String,
    pub page: PageQuery,
    pub order: Vec<OrderBy>,
}

impl SearchQuery {
    /// First page, newest updates first.
    #[must_use]
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            page: PageQuery::default(),
            order: vec![OrderBy {
                field: RankField::UpdatedAt,
                asc: false,
            }],
        }
    }

    /// Select a page.
    #[must_use]
    pub fn page(mut self, page_no: u32, page_size: u32) -> Self {
        self.page = PageQuery { page_no, page_size };
        self
    }

    /// Replace the ordering with a single criterion.
    #[must_use]
    pub fn order_by(mut self, field: RankField, asc: bool) -> Self {
        self.order = vec![OrderBy { field, asc }];
        self
    }
}

/// Saved search.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchGroup {
    #[serde(default)]
    pub search_group_id: String,
    #[serde(default, alias = "groupName")]
    pub search_group_name: String,
    #[serde(default, alias = "groupValue")]
    pub search_query: String,
}

/// Body of `POST /searchGroup/add`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewSearchGroup {
    pub search_group_name: String,
    pub search_query: String,
}

/// `name:value` tag attached to an archive.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArchiveTag {
    pub tag_name: String,
    pub tag_value: String,
}

/// One image inside an archive.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArchiveItem {
    #[serde(default)]
    pub archive_item_id: Option<String>,
    pub archive_item_index: u32,
    #[serde(default)]
    pub archive_item_name: String,
    #[serde(default)]
    pub archive_item_size: Option<u64>,
}

/// Archive summary or detail.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MankaArchive {
    pub archive_id: String,
    #[serde(default)]
    pub archive_name: String,
    #[serde(default)]
    pub archive_cover_url: Option<String>,
    #[serde(default)]
    pub archive_size: Option<u64>,
    #[serde(default)]
    pub archive_total_page: Option<u32>,
    #[serde(default)]
    pub archive_mod_time: Option<String>,
    #[serde(default)]
    pub archive_created_time: Option<String>,
    #[serde(default)]
    pub last_read_page: Option<u32>,
    #[serde(default)]
    pub belong_favorite_id: Option<String>,
    #[serde(default)]
    pub tags: Vec<ArchiveTag>,
    #[serde(default)]
    pub archive_items: Vec<ArchiveItem>,
}

/// Favorite entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Favorite {
    pub favorite_id: String,
    #[serde(default)]
    pub archive: Option<MankaArchive>,
}

/// Payload of `POST /favorite/add`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FavoriteCreated {
    #[serde(default)]
    pub favorite_id: String,
}

/// Body of `POST /favorite/add`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewFavorite {
    pub archive_id: String,
}

/// Body of `POST /user/login`.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    pub user_name: String,
    pub password: String,
}

impl std::fmt::Debug for LoginRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoginRequest")
            .field("user_name", &self.user_name)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Image rendition served by the image link endpoint.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ImgSpec {
    #[serde(rename = "thumb")]
    Thumb,
    #[serde(rename = "c720")]
    Compress720,
    #[default]
    #[serde(rename = "c1280")]
    Compress1280,
    #[serde(rename = "no_resize")]
    NoResize,
    #[serde(rename = "origin")]
    Origin,
}

impl ImgSpec {
    /// Path segment for this rendition.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Thumb => "thumb",
            Self::Compress720 => "c720",
            Self::Compress1280 => "c1280",
            Self::NoResize => "no_resize",
            Self::Origin => "origin",
        }
    }
}
