use std::collections::BTreeMap;

use recordgate_application::{ChartPermissionError, PermissionDirectory};
use recordgate_core::{ActorId, AppError, RenderingId, RoleId};
use recordgate_domain::{
    ChartAggregator, ChartRequest, ChartType, CollectionActionEvent, FilterOperator, FilterTree,
};
use serde_json::json;

use super::{
    ActorRoleAssignment, CollectionGrants, ConditionalGrant, CustomActionGrants,
    DirectorySnapshot, InMemoryPermissionDirectory, RenderingGrants, RoleGrants,
};

const EDITOR: ActorId = ActorId::new(1);
const REVIEWER: ActorId = ActorId::new(2);
const RENDERING: RenderingId = RenderingId::new(100);

fn scope_condition() -> FilterTree {
    FilterTree::leaf("publisher", FilterOperator::Equal, json!("acme"))
}

fn role(
    role_id: u64,
    events: Vec<CollectionActionEvent>,
    publish: CustomActionGrants,
    renderings: Vec<RenderingGrants>,
) -> RoleGrants {
    RoleGrants {
        role_id: RoleId::new(role_id),
        collections: BTreeMap::from([(
            "books".to_owned(),
            CollectionGrants {
                events,
                custom_actions: BTreeMap::from([("publish".to_owned(), publish)]),
            },
        )]),
        renderings,
    }
}

fn snapshot() -> DirectorySnapshot {
    DirectorySnapshot {
        actors: vec![
            ActorRoleAssignment {
                actor_id: EDITOR,
                role_id: RoleId::new(10),
            },
            ActorRoleAssignment {
                actor_id: REVIEWER,
                role_id: RoleId::new(20),
            },
        ],
        roles: vec![
            role(
                10,
                vec![CollectionActionEvent::Browse, CollectionActionEvent::Edit],
                CustomActionGrants {
                    trigger: Some(ConditionalGrant {
                        condition: Some(scope_condition()),
                    }),
                    requires_approval: Some(ConditionalGrant::default()),
                    approve: Some(ConditionalGrant {
                        condition: Some(scope_condition()),
                    }),
                    self_approve: false,
                },
                vec![RenderingGrants {
                    rendering_id: RENDERING,
                    segment_queries: BTreeMap::from([(
                        "books".to_owned(),
                        vec!["SELECT id FROM books WHERE price > 10".to_owned()],
                    )]),
                    charts: vec![
                        ChartRequest::value("books", ChartAggregator::Count, None),
                        ChartRequest::query(ChartType::Value, "SELECT count(*) AS value FROM books"),
                    ],
                }],
            ),
            role(
                20,
                vec![CollectionActionEvent::Read],
                CustomActionGrants {
                    approve: Some(ConditionalGrant::default()),
                    self_approve: true,
                    ..CustomActionGrants::default()
                },
                Vec::new(),
            ),
        ],
    }
}

fn directory() -> InMemoryPermissionDirectory {
    InMemoryPermissionDirectory::from_snapshot(snapshot())
        .unwrap_or_else(|_| panic!("valid snapshot"))
}

#[tokio::test]
async fn collection_events_follow_role_grants() {
    let directory = directory();

    assert!(matches!(
        directory
            .can_on_collection(EDITOR, "books", CollectionActionEvent::Edit)
            .await,
        Ok(true)
    ));
    assert!(matches!(
        directory
            .can_on_collection(EDITOR, "books", CollectionActionEvent::Delete)
            .await,
        Ok(false)
    ));
    assert!(matches!(
        directory
            .can_on_collection(EDITOR, "authors", CollectionActionEvent::Browse)
            .await,
        Ok(false)
    ));
}

#[tokio::test]
async fn unknown_actor_is_not_found() {
    let result = directory()
        .can_on_collection(ActorId::new(99), "books", CollectionActionEvent::Read)
        .await;

    assert!(matches!(result, Err(AppError::NotFound(_))));
}

#[tokio::test]
async fn segment_queries_match_ignoring_whitespace() {
    let directory = directory();

    assert!(matches!(
        directory
            .can_execute_segment_query(
                EDITOR,
                "books",
                RENDERING,
                "SELECT id\n  FROM books WHERE price > 10;",
            )
            .await,
        Ok(true)
    ));
    assert!(matches!(
        directory
            .can_execute_segment_query(EDITOR, "books", RenderingId::new(7), "SELECT id FROM books WHERE price > 10")
            .await,
        Ok(false)
    ));
}

#[tokio::test]
async fn charts_must_be_granted_in_the_rendering() {
    let directory = directory();

    assert!(matches!(
        directory
            .can_execute_chart(
                EDITOR,
                RENDERING,
                &ChartRequest::value("books", ChartAggregator::Count, None),
            )
            .await,
        Ok(true)
    ));
    assert!(matches!(
        directory
            .can_execute_chart(
                EDITOR,
                RENDERING,
                &ChartRequest::value("books", ChartAggregator::Sum, Some("price".to_owned())),
            )
            .await,
        Ok(false)
    ));
    assert!(matches!(
        directory
            .can_execute_chart(
                EDITOR,
                RENDERING,
                &ChartRequest::query(ChartType::Value, "select count(*) AS value from books"),
            )
            .await,
        Ok(false)
    ));
    assert!(matches!(
        directory
            .can_execute_chart(
                EDITOR,
                RENDERING,
                &ChartRequest::query(ChartType::Value, "SELECT count(*)  AS value FROM books;"),
            )
            .await,
        Ok(true)
    ));
}

#[tokio::test]
async fn chart_sql_is_validated_before_lookup() {
    let result = directory()
        .can_execute_chart(
            ActorId::new(99),
            RENDERING,
            &ChartRequest::query(ChartType::Value, "DROP TABLE books"),
        )
        .await;

    assert!(matches!(result, Err(ChartPermissionError::NonSelectQuery)));
}

#[tokio::test]
async fn custom_action_grants_expose_conditions() {
    let directory = directory();

    assert!(matches!(
        directory
            .can_trigger_custom_action(EDITOR, "books", "publish")
            .await,
        Ok(true)
    ));
    assert!(matches!(
        directory
            .can_trigger_custom_action(REVIEWER, "books", "publish")
            .await,
        Ok(false)
    ));
    assert!(matches!(
        directory
            .does_trigger_custom_action_require_approval(EDITOR, "books", "publish")
            .await,
        Ok(true)
    ));
    assert!(matches!(
        directory
            .conditional_trigger_condition(EDITOR, "books", "publish")
            .await,
        Ok(Some(ref condition)) if condition == &scope_condition()
    ));
    assert!(matches!(
        directory
            .conditional_requires_approval_condition(EDITOR, "books", "publish")
            .await,
        Ok(None)
    ));
}

#[tokio::test]
async fn self_approval_requires_the_role_flag() {
    let directory = directory();

    assert!(matches!(
        directory
            .can_approve_custom_action(EDITOR, "books", "publish", EDITOR)
            .await,
        Ok(false)
    ));
    assert!(matches!(
        directory
            .can_approve_custom_action(EDITOR, "books", "publish", REVIEWER)
            .await,
        Ok(true)
    ));
    assert!(matches!(
        directory
            .can_approve_custom_action(REVIEWER, "books", "publish", REVIEWER)
            .await,
        Ok(true)
    ));
}

#[tokio::test]
async fn approve_conditions_only_cover_the_actors_eligible_role() {
    let directory = directory();

    let for_other_requester = directory
        .conditional_approve_conditions(EDITOR, "books", "publish", REVIEWER)
        .await
        .unwrap_or_default();
    let entries: Vec<(RoleId, Option<FilterTree>)> = for_other_requester.into();
    assert_eq!(entries, vec![(RoleId::new(10), Some(scope_condition()))]);

    assert!(matches!(
        directory
            .conditional_approve_conditions(EDITOR, "books", "publish", EDITOR)
            .await,
        Ok(ref conditions) if conditions.is_empty()
    ));

    let self_approval = directory
        .conditional_approve_conditions(REVIEWER, "books", "publish", REVIEWER)
        .await
        .unwrap_or_default();
    let entries: Vec<(RoleId, Option<FilterTree>)> = self_approval.into();
    assert_eq!(entries, vec![(RoleId::new(20), None)]);
}

#[tokio::test]
async fn unconditional_approvers_are_listed_across_roles() {
    assert!(matches!(
        directory()
            .role_ids_allowed_to_approve_without_conditions("books", "publish")
            .await,
        Ok(ref role_ids) if role_ids == &vec![RoleId::new(20)]
    ));
}

#[tokio::test]
async fn invalid_snapshots_are_rejected() {
    let mut dangling = snapshot();
    dangling.actors.push(ActorRoleAssignment {
        actor_id: ActorId::new(3),
        role_id: RoleId::new(30),
    });
    assert!(matches!(
        InMemoryPermissionDirectory::from_snapshot(dangling),
        Err(AppError::Validation(_))
    ));

    let mut duplicated = snapshot();
    let first_role = duplicated.roles[0].clone();
    duplicated.roles.push(first_role);
    assert!(matches!(
        InMemoryPermissionDirectory::from_snapshot(duplicated),
        Err(AppError::Validation(_))
    ));
}

#[tokio::test]
async fn replaced_snapshot_is_served() {
    let directory = directory();
    let mut restricted = snapshot();
    restricted.roles[0]
        .collections
        .values_mut()
        .for_each(|collection| collection.events.clear());

    assert!(directory.replace_snapshot(restricted).await.is_ok());
    assert!(matches!(
        directory
            .can_on_collection(EDITOR, "books", CollectionActionEvent::Browse)
            .await,
        Ok(false)
    ));
}

#[test]
fn snapshot_deserializes_from_plain_json() {
    let snapshot: Result<DirectorySnapshot, _> = serde_json::from_value(json!({
        "actors": [{"actor_id": 1, "role_id": 10}],
        "roles": [{
            "role_id": 10,
            "collections": {"books": {
                "events": ["browse"],
                "custom_actions": {"publish": {
                    "trigger": {"condition": {"field": "publisher", "operator": "equal", "value": "acme"}}
                }}
            }}
        }]
    }));

    assert!(matches!(
        snapshot,
        Ok(ref snapshot) if snapshot.roles[0].collections["books"].custom_actions["publish"]
            .trigger
            .as_ref()
            .and_then(|grant| grant.condition.as_ref())
            == Some(&scope_condition())
    ));
}
