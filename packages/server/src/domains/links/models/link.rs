use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use sqlx::PgPool;
use typed_builder::TypedBuilder;

use crate::common::LinkId;

/// A submitted link with its full moderation, security, and report state.
///
/// `status` and `security_status` are stored as strings (the wire and column
/// representation); typed views are exposed via [`LinkRecord::moderation`]
/// and [`LinkRecord::security`] so unknown legacy values degrade instead of
/// failing to decode.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct LinkRecord {
    pub id: LinkId,
    #[serde(rename = "from")]
    pub from_name: String,
    pub message: String,
    pub url: String,
    pub tags: Vec<String>,
    pub is_anonymous: bool,
    pub is_verified: bool,

    /// Moderation state: 'approved', 'pending_review', 'flagged', 'rejected'
    pub status: String,

    /// Scan state: 'pending', 'safe', 'suspicious', 'malicious'
    pub security_status: String,
    /// Opaque detail payload from the scan engine; None until a scan lands.
    pub security_scan: Option<JsonValue>,

    /// Cached cardinality of `reported_by`.
    pub report_count: i32,
    /// Reporter pseudo-identities that already counted against this link.
    pub reported_by: Vec<String>,

    pub meta_title: String,
    pub meta_image: Option<String>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl LinkRecord {
    /// Typed moderation state. Legacy or missing values read as approved.
    pub fn moderation(&self) -> LinkStatus {
        self.status.parse().unwrap_or(LinkStatus::Approved)
    }

    /// Typed scan state. Unrecognized stored values read as unknown.
    pub fn security(&self) -> SecurityStatus {
        self.security_status
            .parse()
            .unwrap_or(SecurityStatus::Unknown)
    }

    /// Whether the record belongs in the public feed.
    pub fn is_publicly_visible(&self) -> bool {
        self.moderation() == LinkStatus::Approved
    }
}

// =============================================================================
// Enums for type-safe edges
// =============================================================================

/// Moderation status enum
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum LinkStatus {
    Approved,
    PendingReview,
    Flagged,
    Rejected,
}

impl std::fmt::Display for LinkStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LinkStatus::Approved => write!(f, "approved"),
            LinkStatus::PendingReview => write!(f, "pending_review"),
            LinkStatus::Flagged => write!(f, "flagged"),
            LinkStatus::Rejected => write!(f, "rejected"),
        }
    }
}

impl std::str::FromStr for LinkStatus {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "approved" => Ok(LinkStatus::Approved),
            "pending_review" => Ok(LinkStatus::PendingReview),
            "flagged" => Ok(LinkStatus::Flagged),
            "rejected" => Ok(LinkStatus::Rejected),
            _ => Err(anyhow::anyhow!("Invalid link status: {}", s)),
        }
    }
}

/// Scan status enum. `Unknown` is a read-side fallback for legacy records;
/// the core never writes it.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SecurityStatus {
    Pending,
    Safe,
    Suspicious,
    Malicious,
    Unknown,
}

impl std::fmt::Display for SecurityStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SecurityStatus::Pending => write!(f, "pending"),
            SecurityStatus::Safe => write!(f, "safe"),
            SecurityStatus::Suspicious => write!(f, "suspicious"),
            SecurityStatus::Malicious => write!(f, "malicious"),
            SecurityStatus::Unknown => write!(f, "unknown"),
        }
    }
}

impl std::str::FromStr for SecurityStatus {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "pending" => Ok(SecurityStatus::Pending),
            "safe" => Ok(SecurityStatus::Safe),
            "suspicious" => Ok(SecurityStatus::Suspicious),
            "malicious" => Ok(SecurityStatus::Malicious),
            "unknown" => Ok(SecurityStatus::Unknown),
            _ => Err(anyhow::anyhow!("Invalid security status: {}", s)),
        }
    }
}

/// A scan engine verdict. Deliberately excludes `pending`/`unknown` so a
/// result application can only ever carry a terminal classification.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ScanVerdict {
    Safe,
    Suspicious,
    Malicious,
}

impl ScanVerdict {
    pub fn as_security_status(self) -> SecurityStatus {
        match self {
            ScanVerdict::Safe => SecurityStatus::Safe,
            ScanVerdict::Suspicious => SecurityStatus::Suspicious,
            ScanVerdict::Malicious => SecurityStatus::Malicious,
        }
    }
}

impl std::fmt::Display for ScanVerdict {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ScanVerdict::Safe => write!(f, "safe"),
            ScanVerdict::Suspicious => write!(f, "suspicious"),
            ScanVerdict::Malicious => write!(f, "malicious"),
        }
    }
}

impl std::str::FromStr for ScanVerdict {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "safe" => Ok(ScanVerdict::Safe),
            "suspicious" => Ok(ScanVerdict::Suspicious),
            "malicious" => Ok(ScanVerdict::Malicious),
            _ => Err(anyhow::anyhow!("Invalid scan verdict: {}", s)),
        }
    }
}

/// The fixed tag catalog. Submissions and admin edits may only use these ids.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum LinkTag {
    #[serde(rename = "3d")]
    ThreeD,
    #[serde(rename = "design")]
    Design,
    #[serde(rename = "code")]
    Code,
    #[serde(rename = "tutorial")]
    Tutorial,
    #[serde(rename = "tools")]
    Tools,
    #[serde(rename = "ai")]
    Ai,
    #[serde(rename = "music")]
    Music,
    #[serde(rename = "video")]
    Video,
    #[serde(rename = "fonts")]
    Fonts,
    #[serde(rename = "game")]
    Game,
    #[serde(rename = "android")]
    Android,
    #[serde(rename = "windows")]
    Windows,
    #[serde(rename = "other")]
    Other,
}

impl std::fmt::Display for LinkTag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let id = match self {
            LinkTag::ThreeD => "3d",
            LinkTag::Design => "design",
            LinkTag::Code => "code",
            LinkTag::Tutorial => "tutorial",
            LinkTag::Tools => "tools",
            LinkTag::Ai => "ai",
            LinkTag::Music => "music",
            LinkTag::Video => "video",
            LinkTag::Fonts => "fonts",
            LinkTag::Game => "game",
            LinkTag::Android => "android",
            LinkTag::Windows => "windows",
            LinkTag::Other => "other",
        };
        write!(f, "{}", id)
    }
}

impl std::str::FromStr for LinkTag {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "3d" => Ok(LinkTag::ThreeD),
            "design" => Ok(LinkTag::Design),
            "code" => Ok(LinkTag::Code),
            "tutorial" => Ok(LinkTag::Tutorial),
            "tools" => Ok(LinkTag::Tools),
            "ai" => Ok(LinkTag::Ai),
            "music" => Ok(LinkTag::Music),
            "video" => Ok(LinkTag::Video),
            "fonts" => Ok(LinkTag::Fonts),
            "game" => Ok(LinkTag::Game),
            "android" => Ok(LinkTag::Android),
            "windows" => Ok(LinkTag::Windows),
            "other" => Ok(LinkTag::Other),
            _ => Err(anyhow::anyhow!("Unknown tag: {}", s)),
        }
    }
}

// =============================================================================
// Write models
// =============================================================================

/// A validated, normalized submission ready to persist. The store assigns
/// id, timestamps, and the initial status/security/report fields.
#[derive(Debug, Clone, TypedBuilder)]
pub struct NewLink {
    #[builder(setter(into))]
    pub from_name: String,
    #[builder(setter(into))]
    pub message: String,
    #[builder(setter(into))]
    pub url: String,
    pub tags: Vec<String>,
    #[builder(default)]
    pub is_anonymous: bool,
    #[builder(default)]
    pub is_verified: bool,
    #[builder(setter(into))]
    pub meta_title: String,
    #[builder(default)]
    pub meta_image: Option<String>,
}

/// The administrative field group. Every field is optional; absent fields are
/// left untouched. Unknown fields in an incoming payload are dropped by serde
/// before they reach this struct, which is the update allow-list.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LinkUpdate {
    #[serde(rename = "from")]
    pub from_name: Option<String>,
    pub message: Option<String>,
    pub status: Option<String>,
    pub url: Option<String>,
    pub tags: Option<Vec<String>>,
    pub is_verified: Option<bool>,
}

impl LinkUpdate {
    pub fn is_empty(&self) -> bool {
        self.from_name.is_none()
            && self.message.is_none()
            && self.status.is_none()
            && self.url.is_none()
            && self.tags.is_none()
            && self.is_verified.is_none()
    }
}

// =============================================================================
// Read model
// =============================================================================

/// The public projection of a record. Moderation status, report data, and
/// the raw scan payload never leave the admin surface.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PublicLink {
    pub id: LinkId,
    #[serde(rename = "from")]
    pub from_name: String,
    pub message: String,
    pub url: String,
    pub tags: Vec<String>,
    pub is_anonymous: bool,
    pub is_verified: bool,
    pub security_status: SecurityStatus,
    pub meta_title: String,
    pub meta_image: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<LinkRecord> for PublicLink {
    fn from(record: LinkRecord) -> Self {
        let security_status = record.security();
        Self {
            id: record.id,
            from_name: record.from_name,
            message: record.message,
            url: record.url,
            tags: record.tags,
            is_anonymous: record.is_anonymous,
            is_verified: record.is_verified,
            security_status,
            meta_title: record.meta_title,
            meta_image: record.meta_image,
            created_at: record.created_at,
        }
    }
}

// =============================================================================
// SQL Queries - ALL queries must be in models/
// =============================================================================

impl LinkRecord {
    /// Insert a new link with default lifecycle fields.
    pub async fn insert(new: &NewLink, pool: &PgPool) -> Result<Self> {
        let record = sqlx::query_as::<_, Self>(
            "INSERT INTO links
                 (id, from_name, message, url, tags, is_anonymous, is_verified,
                  meta_title, meta_image)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
             RETURNING *",
        )
        .bind(LinkId::new())
        .bind(&new.from_name)
        .bind(&new.message)
        .bind(&new.url)
        .bind(&new.tags)
        .bind(new.is_anonymous)
        .bind(new.is_verified)
        .bind(&new.meta_title)
        .bind(&new.meta_image)
        .fetch_one(pool)
        .await?;
        Ok(record)
    }

    /// Find a link by ID
    pub async fn find_by_id(id: LinkId, pool: &PgPool) -> Result<Option<Self>> {
        let link = sqlx::query_as::<_, Self>("SELECT * FROM links WHERE id = $1")
            .bind(id)
            .fetch_optional(pool)
            .await?;
        Ok(link)
    }

    /// All links, newest first (id breaks created_at ties for a stable feed).
    pub async fn list_all(pool: &PgPool) -> Result<Vec<Self>> {
        let links =
            sqlx::query_as::<_, Self>("SELECT * FROM links ORDER BY created_at DESC, id DESC")
                .fetch_all(pool)
                .await?;
        Ok(links)
    }

    /// Publicly visible links only, same ordering as `list_all`.
    pub async fn list_approved(pool: &PgPool) -> Result<Vec<Self>> {
        let links = sqlx::query_as::<_, Self>(
            "SELECT * FROM links
             WHERE status = 'approved'
             ORDER BY created_at DESC, id DESC",
        )
        .fetch_all(pool)
        .await?;
        Ok(links)
    }

    /// Apply the administrative field group in one statement. Absent fields
    /// keep their stored value.
    pub async fn update_fields(id: LinkId, update: &LinkUpdate, pool: &PgPool) -> Result<bool> {
        let result = sqlx::query(
            "UPDATE links SET
                 from_name   = COALESCE($2, from_name),
                 message     = COALESCE($3, message),
                 status      = COALESCE($4, status),
                 url         = COALESCE($5, url),
                 tags        = COALESCE($6, tags),
                 is_verified = COALESCE($7, is_verified),
                 updated_at  = NOW()
             WHERE id = $1",
        )
        .bind(id)
        .bind(&update.from_name)
        .bind(&update.message)
        .bind(&update.status)
        .bind(&update.url)
        .bind(&update.tags)
        .bind(update.is_verified)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Overwrite the scan field group (last write wins).
    pub async fn apply_scan(
        id: LinkId,
        security_status: &str,
        detail: &JsonValue,
        pool: &PgPool,
    ) -> Result<bool> {
        let result = sqlx::query(
            "UPDATE links SET
                 security_status = $2,
                 security_scan   = $3,
                 updated_at      = NOW()
             WHERE id = $1",
        )
        .bind(id)
        .bind(security_status)
        .bind(detail)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Count a report from `reporter` if they have not reported this link
    /// yet. The membership check and the increment are a single conditional
    /// statement, so concurrent duplicates cannot double-count.
    ///
    /// Returns the new count when the report was added, None when the
    /// reporter was already present or the link does not exist.
    pub async fn record_report(id: LinkId, reporter: &str, pool: &PgPool) -> Result<Option<i32>> {
        let count = sqlx::query_scalar::<_, i32>(
            "UPDATE links SET
                 reported_by  = array_append(reported_by, $2),
                 report_count = report_count + 1,
                 updated_at   = NOW()
             WHERE id = $1 AND NOT (reported_by @> ARRAY[$2])
             RETURNING report_count",
        )
        .bind(id)
        .bind(reporter)
        .fetch_optional(pool)
        .await?;
        Ok(count)
    }

    /// Hard delete. Returns false when the link was already gone.
    pub async fn delete(id: LinkId, pool: &PgPool) -> Result<bool> {
        let result = sqlx::query("DELETE FROM links WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
