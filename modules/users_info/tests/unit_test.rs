//! Service and in-process client tests over the in-memory repository.

use users_info::{
    config::UsersInfoConfig,
    contract::{NewUser, UserPatch, UsersInfoApi, UsersInfoError},
    UsersInfo,
};

fn new_user(name: &str) -> NewUser {
    NewUser {
        username: name.to_string(),
        email: format!("{name}@example.com"),
        ..NewUser::default()
    }
}

#[tokio::test]
async fn client_round_trip() {
    let client = UsersInfo::in_memory(&UsersInfoConfig::default()).client();

    let created = client.create_user(new_user("carol")).await.unwrap();
    assert_eq!(client.get_user(created.id).await.unwrap(), created);

    let patch = UserPatch {
        full_name: Some(Some("Carol C.".into())),
        ..UserPatch::default()
    };
    let updated = client.update_user(created.id, patch).await.unwrap();
    assert_eq!(updated.full_name.as_deref(), Some("Carol C."));
    assert!(updated.updated_at >= created.updated_at);

    client.delete_user(created.id).await.unwrap();
    assert_eq!(
        client.get_user(created.id).await,
        Err(UsersInfoError::not_found(created.id))
    );
}

#[tokio::test]
async fn duplicates_surface_as_conflicts() {
    let client = UsersInfo::in_memory(&UsersInfoConfig::default()).client();
    client.create_user(new_user("dave")).await.unwrap();

    let err = client.create_user(new_user("dave")).await.unwrap_err();
    assert_eq!(err, UsersInfoError::conflict("username", "dave"));

    let mut other = new_user("erin");
    other.email = "dave@example.com".into();
    let err = client.create_user(other).await.unwrap_err();
    assert_eq!(err, UsersInfoError::conflict("email", "dave@example.com"));
}

#[tokio::test]
async fn invalid_email_is_a_validation_error() {
    let client = UsersInfo::in_memory(&UsersInfoConfig::default()).client();
    let mut u = new_user("frank");
    u.email = "not-an-email".into();
    assert!(matches!(
        client.create_user(u).await,
        Err(UsersInfoError::Validation { .. })
    ));
}

#[tokio::test]
async fn configured_default_limit_applies_when_absent() {
    let cfg = UsersInfoConfig {
        default_list_limit: 2,
    };
    let client = UsersInfo::in_memory(&cfg).client();
    for name in ["g1", "g2", "g3"] {
        client.create_user(new_user(name)).await.unwrap();
    }
    assert_eq!(client.list_users(None, None).await.unwrap().len(), 2);
    assert_eq!(client.list_users(None, Some(10)).await.unwrap().len(), 3);
    assert_eq!(client.list_users(Some(2), None).await.unwrap().len(), 1);
}
