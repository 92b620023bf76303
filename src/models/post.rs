// ============================================================================
// Catalog Parsing Functions
// ============================================================================
//
// These functions provide string-based parsing and validation for post
// catalogs handed off by the authoring collaborator, with a checksum over
// the raw JSON for change detection.

use crate::api::EvergreenPost;
use crate::models::time;
use anyhow::{Context, Result};
use std::collections::HashSet;

#[derive(serde::Deserialize)]
struct CatalogInput {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub checksum: String,
    #[serde(default)]
    pub posts: Vec<EvergreenPost>,
}

/// A parsed and validated post catalog.
#[derive(Debug, Clone)]
pub struct CatalogDocument {
    pub name: String,
    /// SHA256 checksum of the raw catalog JSON.
    pub checksum: String,
    pub posts: Vec<EvergreenPost>,
}

fn validate_input_catalog(catalog_json: &str) -> Result<()> {
    let value: serde_json::Value =
        serde_json::from_str(catalog_json).context("Invalid catalog JSON")?;
    let has_posts = value.as_object().and_then(|obj| obj.get("posts")).is_some();
    if !has_posts {
        anyhow::bail!("Missing required 'posts' field");
    }
    Ok(())
}

/// Validate a single post against the catalog invariants.
///
/// Checked at creation time so scheduling never rediscovers bad
/// configuration:
/// - non-empty base content
/// - positive, ordered interval bounds and a positive recycle cap
/// - `current_recycles <= max_recycles`
/// - a known IANA timezone
/// - no duplicate platform identifiers
/// - `next_post_at`, when set, strictly after `last_posted_at` and within
///   the interval bounds in timezone-adjusted calendar days
pub fn validate_post(post: &EvergreenPost) -> Result<(), String> {
    if post.base_content.trim().is_empty() {
        return Err("base_content must not be empty".to_string());
    }

    post.recycle.validate()?;

    let tz = time::parse_timezone(&post.schedule.timezone)
        .ok_or_else(|| format!("Unknown timezone '{}'", post.schedule.timezone))?;

    let mut seen = HashSet::new();
    for platform in &post.platforms {
        if platform.value().trim().is_empty() {
            return Err("Platform identifiers must not be empty".to_string());
        }
        if !seen.insert(platform) {
            return Err(format!("Duplicate platform '{}'", platform));
        }
    }

    if let (Some(last), Some(next)) = (post.schedule.last_posted_at, post.schedule.next_post_at) {
        if next <= last {
            return Err("next_post_at must lie strictly after last_posted_at".to_string());
        }
        let gap = time::days_between(last, next, tz);
        if gap < post.recycle.min_interval_days as i64
            || gap > post.recycle.max_interval_days as i64
        {
            return Err(format!(
                "next_post_at is {} days after last_posted_at, outside [{}, {}]",
                gap, post.recycle.min_interval_days, post.recycle.max_interval_days
            ));
        }
    }

    Ok(())
}

/// Parse a post catalog from a JSON string.
///
/// This function deserializes a catalog JSON string using Serde, validates
/// every post against the catalog invariants, and computes a checksum over
/// the raw JSON when the document does not carry one.
///
/// # Arguments
///
/// * `catalog_json` - Catalog JSON (snake_case format matching the schema)
///
/// # Returns
///
/// A fully validated `CatalogDocument` with a computed checksum.
pub fn parse_catalog_json_str(catalog_json: &str) -> Result<CatalogDocument> {
    validate_input_catalog(catalog_json)?;

    let input: CatalogInput = serde_json::from_str(catalog_json)
        .context("Failed to deserialize catalog JSON using Serde")?;

    let mut ids = HashSet::new();
    for post in &input.posts {
        validate_post(post)
            .map_err(|e| anyhow::anyhow!("Invalid post {}: {}", post.id, e))?;
        if !ids.insert(post.id) {
            anyhow::bail!("Duplicate post id {}", post.id);
        }
    }

    let checksum = if input.checksum.is_empty() {
        compute_catalog_checksum(catalog_json)
    } else {
        input.checksum
    };

    Ok(CatalogDocument {
        name: input.name,
        checksum,
        posts: input.posts,
    })
}

/// Compute a checksum for the catalog JSON
fn compute_catalog_checksum(json_str: &str) -> String {
    use sha2::{Digest, Sha256};
    let mut hasher = Sha256::new();
    hasher.update(json_str.as_bytes());
    let result = hasher.finalize();
    hex::encode(result)
}

// ============================================================================
// Tests
// ============================================================================
