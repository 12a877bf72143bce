//! Moderation actions - admin-driven edits over link records.
//!
//! The moderation machine has no forbidden transitions: an admin may move a
//! record between any two statuses, re-approve a rejection, or flip the
//! verified badge at will. Only the field allow-list and per-field validity
//! are enforced here.

use std::sync::Arc;

use tracing::info;

use super::clamp;
use crate::common::{AppError, AppResult, LinkId};
use crate::domains::links::models::{LinkStatus, LinkTag, LinkUpdate};
use crate::domains::links::store::LinkStore;
use crate::kernel::ServerDeps;

/// Admin edits share one generous cap across free-text fields.
const ADMIN_FIELD_MAX_CHARS: usize = 2000;

/// Apply an administrative field update. Fields outside the allow-list never
/// reach this function (serde drops them at the edge); fields present are
/// validated, trimmed, and capped before persisting.
pub async fn update_link(
    link_id: LinkId,
    mut update: LinkUpdate,
    deps: &Arc<ServerDeps>,
) -> AppResult<()> {
    if let Some(status) = &update.status {
        status
            .parse::<LinkStatus>()
            .map_err(|_| AppError::Validation(format!("Invalid link status: {status}")))?;
    }

    if let Some(tags) = &update.tags {
        if tags.is_empty() {
            return Err(AppError::Validation("At least one tag is required".into()));
        }
        for tag in tags {
            tag.parse::<LinkTag>()
                .map_err(|_| AppError::Validation(format!("Unknown tag: {tag}")))?;
        }
    }

    update.from_name = update
        .from_name
        .map(|value| clamp(&value, ADMIN_FIELD_MAX_CHARS));
    update.message = update
        .message
        .map(|value| clamp(&value, ADMIN_FIELD_MAX_CHARS));
    update.url = update.url.map(|value| clamp(&value, ADMIN_FIELD_MAX_CHARS));

    let updated = deps
        .links
        .update_fields(link_id, update)
        .await
        .map_err(AppError::Internal)?;

    if !updated {
        return Err(AppError::NotFound("Link"));
    }

    info!(link_id = %link_id, "link updated by admin");
    Ok(())
}

/// Flip a record between flagged and approved. Anything that is not
/// currently flagged becomes flagged; flagged becomes approved.
pub async fn toggle_flag(link_id: LinkId, deps: &Arc<ServerDeps>) -> AppResult<LinkStatus> {
    let Some(record) = deps.links.get(link_id).await.map_err(AppError::Internal)? else {
        return Err(AppError::NotFound("Link"));
    };

    let next = if record.moderation() == LinkStatus::Flagged {
        LinkStatus::Approved
    } else {
        LinkStatus::Flagged
    };

    let updated = deps
        .links
        .update_fields(
            link_id,
            LinkUpdate {
                status: Some(next.to_string()),
                ..Default::default()
            },
        )
        .await
        .map_err(AppError::Internal)?;

    if !updated {
        return Err(AppError::NotFound("Link"));
    }

    info!(link_id = %link_id, status = %next, "link flag toggled");
    Ok(next)
}

/// Hard-delete a record. There is no tombstone; an in-flight scan result for
/// this id will land on nothing and be dropped.
pub async fn delete_link(link_id: LinkId, deps: &Arc<ServerDeps>) -> AppResult<()> {
    let deleted = deps
        .links
        .delete(link_id)
        .await
        .map_err(AppError::Internal)?;

    if !deleted {
        return Err(AppError::NotFound("Link"));
    }

    info!(link_id = %link_id, "link deleted by admin");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domains::links::models::NewLink;
    use crate::domains::links::store::LinkStore;
    use crate::kernel::test_dependencies::TestDependencies;

    async fn seeded_deps() -> (Arc<ServerDeps>, LinkId) {
        let test_deps = TestDependencies::new();
        let deps = test_deps.server_deps();
        let record = deps
            .links
            .create(
                NewLink::builder()
                    .from_name("Ada")
                    .message("a message")
                    .url("https://example.com")
                    .tags(vec!["code".to_string()])
                    .meta_title("https://example.com")
                    .build(),
            )
            .await
            .unwrap();
        (deps, record.id)
    }

    #[tokio::test]
    async fn test_update_applies_only_present_fields() {
        let (deps, id) = seeded_deps().await;
        update_link(
            id,
            LinkUpdate {
                status: Some("flagged".to_string()),
                ..Default::default()
            },
            &deps,
        )
        .await
        .unwrap();

        let record = deps.links.get(id).await.unwrap().unwrap();
        assert_eq!(record.moderation(), LinkStatus::Flagged);
        // Untouched fields keep their values.
        assert_eq!(record.from_name, "Ada");
        assert_eq!(record.message, "a message");
    }

    #[tokio::test]
    async fn test_unknown_payload_fields_are_ignored_entirely() {
        let (deps, id) = seeded_deps().await;
        // The edge deserializes updates through LinkUpdate, so junk fields
        // vanish instead of erroring or persisting.
        let update: LinkUpdate = serde_json::from_value(serde_json::json!({
            "status": "flagged",
            "notAField": "x",
        }))
        .unwrap();
        update_link(id, update, &deps).await.unwrap();

        let record = deps.links.get(id).await.unwrap().unwrap();
        assert_eq!(record.moderation(), LinkStatus::Flagged);
    }

    #[tokio::test]
    async fn test_invalid_status_rejected() {
        let (deps, id) = seeded_deps().await;
        let err = update_link(
            id,
            LinkUpdate {
                status: Some("vanished".to_string()),
                ..Default::default()
            },
            &deps,
        )
        .await
        .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[tokio::test]
    async fn test_empty_tags_rejected() {
        let (deps, id) = seeded_deps().await;
        let err = update_link(
            id,
            LinkUpdate {
                tags: Some(vec![]),
                ..Default::default()
            },
            &deps,
        )
        .await
        .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[tokio::test]
    async fn test_any_transition_is_allowed() {
        let (deps, id) = seeded_deps().await;
        // rejected -> approved is legal; the machine has no terminal state.
        for status in ["rejected", "approved", "pending_review", "flagged", "approved"] {
            update_link(
                id,
                LinkUpdate {
                    status: Some(status.to_string()),
                    ..Default::default()
                },
                &deps,
            )
            .await
            .unwrap();
            let record = deps.links.get(id).await.unwrap().unwrap();
            assert_eq!(record.status, status);
        }
    }

    #[tokio::test]
    async fn test_verified_badge_is_admin_editable() {
        let (deps, id) = seeded_deps().await;
        update_link(
            id,
            LinkUpdate {
                is_verified: Some(true),
                ..Default::default()
            },
            &deps,
        )
        .await
        .unwrap();
        assert!(deps.links.get(id).await.unwrap().unwrap().is_verified);

        update_link(
            id,
            LinkUpdate {
                is_verified: Some(false),
                ..Default::default()
            },
            &deps,
        )
        .await
        .unwrap();
        assert!(!deps.links.get(id).await.unwrap().unwrap().is_verified);
    }

    #[tokio::test]
    async fn test_update_missing_link_is_not_found() {
        let test_deps = TestDependencies::new();
        let deps = test_deps.server_deps();
        let err = update_link(LinkId::new(), LinkUpdate::default(), &deps)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_toggle_flag_roundtrip() {
        let (deps, id) = seeded_deps().await;
        assert_eq!(toggle_flag(id, &deps).await.unwrap(), LinkStatus::Flagged);
        assert_eq!(toggle_flag(id, &deps).await.unwrap(), LinkStatus::Approved);
    }

    #[tokio::test]
    async fn test_toggle_flags_non_approved_states_too() {
        let (deps, id) = seeded_deps().await;
        update_link(
            id,
            LinkUpdate {
                status: Some("rejected".to_string()),
                ..Default::default()
            },
            &deps,
        )
        .await
        .unwrap();
        // rejected is "not flagged", so the toggle flags it.
        assert_eq!(toggle_flag(id, &deps).await.unwrap(), LinkStatus::Flagged);
    }

    #[tokio::test]
    async fn test_delete_then_delete_again() {
        let (deps, id) = seeded_deps().await;
        delete_link(id, &deps).await.unwrap();
        let err = delete_link(id, &deps).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }
}
