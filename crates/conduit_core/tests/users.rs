mod common;

use common::{follow, new_user, plain_verifier, register};
use conduit_core::{
    open_db_in_memory, CancelToken, NewUser, RepoError, SqliteUserRepository, User, UserFilter,
    UserPatch, UserRepository, UserService,
};

#[test]
fn create_returns_stored_user_with_id_and_timestamps() {
    let db = open_db_in_memory().unwrap();
    let repo = SqliteUserRepository::new(db);

    let user = repo.create(&CancelToken::new(), &new_user("jake")).unwrap();

    assert!(user.id > 0);
    assert_eq!(user.email, "jake@conduit.test");
    assert_eq!(user.username, "jake");
    assert_eq!(user.bio, "bio of jake");
    assert!(user.created_at > 0);
    assert_eq!(user.created_at, user.updated_at);
    assert!(user.following.is_empty());
    assert!(user.followers.is_empty());
}

#[test]
fn create_reports_which_unique_field_collided() {
    let db = open_db_in_memory().unwrap();
    let repo = SqliteUserRepository::new(db);
    let cancel = CancelToken::new();
    repo.create(&cancel, &new_user("jake")).unwrap();

    let same_email = NewUser {
        username: "jacob".to_string(),
        ..new_user("jake")
    };
    let err = repo.create(&cancel, &same_email).unwrap_err();
    assert!(matches!(err, RepoError::DuplicateEmail));
    assert!(err.is_client_error());

    let same_username = NewUser {
        email: "other@conduit.test".to_string(),
        ..new_user("jake")
    };
    let err = repo.create(&cancel, &same_username).unwrap_err();
    assert!(matches!(err, RepoError::DuplicateUsername));
}

#[test]
fn find_many_loads_follow_relationships() {
    let db = open_db_in_memory().unwrap();
    let jake = register(&db, "jake");
    let jane = register(&db, "jane");
    let john = register(&db, "john");
    follow(&db, jake.id, jane.id);
    follow(&db, john.id, jake.id);

    let repo = SqliteUserRepository::new(db);
    let users = repo
        .find_many(&CancelToken::new(), &UserFilter::default())
        .unwrap();
    let usernames: Vec<_> = users.iter().map(|user| user.username.as_str()).collect();
    assert_eq!(usernames, vec!["jake", "jane", "john"]);

    let loaded_jake = &users[0];
    assert!(loaded_jake.is_following(jane.id));
    assert!(loaded_jake.is_followed_by(john.id));
    assert_eq!(loaded_jake.following.len(), 1);
    assert_eq!(loaded_jake.followers.len(), 1);

    let loaded_jane = &users[1];
    assert!(loaded_jane.is_followed_by(jake.id));
    assert!(loaded_jane.following.is_empty());
}

#[test]
fn unreadable_follow_data_leaves_collections_empty() {
    let db = open_db_in_memory().unwrap();
    let jake = register(&db, "jake");
    let jane = register(&db, "jane");
    follow(&db, jake.id, jane.id);
    db.write(&CancelToken::new(), "test_drop_followings", |scope| {
        scope.execute("DROP TABLE followings", [])?;
        Ok(())
    })
    .unwrap();

    let users = SqliteUserRepository::new(db)
        .find_many(&CancelToken::new(), &UserFilter::default())
        .unwrap();

    assert_eq!(users.len(), 2);
    for user in &users {
        assert!(user.followers.is_empty());
        assert!(user.following.is_empty());
    }
}

#[test]
fn find_one_returns_first_match_of_broad_filter() {
    let db = open_db_in_memory().unwrap();
    let jake = register(&db, "jake");
    let jane = register(&db, "jane");
    register(&db, "john");
    let repo = SqliteUserRepository::new(db);
    let cancel = CancelToken::new();

    let first = repo.find_one(&cancel, &UserFilter::default()).unwrap();
    assert_eq!(first.id, jake.id);

    let second = repo
        .find_one(
            &cancel,
            &UserFilter {
                offset: 1,
                limit: 5,
                ..UserFilter::default()
            },
        )
        .unwrap();
    assert_eq!(second.id, jane.id);
}

#[test]
fn find_one_applies_filter_and_reports_missing_user() {
    let db = open_db_in_memory().unwrap();
    register(&db, "jake");
    let jane = register(&db, "jane");
    let repo = SqliteUserRepository::new(db);
    let cancel = CancelToken::new();

    let found = repo
        .find_one(&cancel, &UserFilter::by_username("jane"))
        .unwrap();
    assert_eq!(found.id, jane.id);
    assert_eq!(
        repo.find_by_email(&cancel, "jane@conduit.test").unwrap().id,
        jane.id
    );

    let err = repo
        .find_one(&cancel, &UserFilter::by_username("nobody"))
        .unwrap_err();
    assert!(matches!(err, RepoError::NotFound("user")));

    let mismatched = UserFilter {
        id: Some(jane.id),
        username: Some("jake".to_string()),
        ..UserFilter::default()
    };
    assert!(repo.find_many(&cancel, &mismatched).unwrap().is_empty());
}

#[test]
fn update_persists_patch_and_advances_updated_at() {
    let db = open_db_in_memory().unwrap();
    let repo = SqliteUserRepository::new(db.clone());
    let cancel = CancelToken::new();
    let mut user = repo
        .create(
            &cancel,
            &NewUser {
                image: "https://example.com/jake.png".to_string(),
                ..new_user("jake")
            },
        )
        .unwrap();
    let before = user.updated_at;

    let patch = UserPatch {
        username: Some("jacob".to_string()),
        ..UserPatch::default()
    };
    let updated_at = repo.update(&cancel, &mut user, &patch).unwrap();

    assert!(updated_at > before);
    assert_eq!(user.updated_at, updated_at);
    assert_eq!(user.username, "jacob");

    let stored = repo.find_one(&cancel, &UserFilter::by_id(user.id)).unwrap();
    assert_eq!(stored.username, "jacob");
    assert_eq!(stored.image, "https://example.com/jake.png");
    assert_eq!(stored.updated_at, updated_at);
}

#[test]
fn update_of_missing_user_is_not_found_and_leaves_input_untouched() {
    let db = open_db_in_memory().unwrap();
    let repo = SqliteUserRepository::new(db);
    let mut ghost = User {
        id: 4242,
        username: "ghost".to_string(),
        ..User::default()
    };
    let patch = UserPatch {
        bio: Some("boo".to_string()),
        ..UserPatch::default()
    };

    let err = repo
        .update(&CancelToken::new(), &mut ghost, &patch)
        .unwrap_err();

    assert!(matches!(err, RepoError::NotFound("user")));
    assert_eq!(ghost.bio, "");
}

#[test]
fn update_into_taken_email_fails_without_mutating_user() {
    let db = open_db_in_memory().unwrap();
    register(&db, "jane");
    let mut jake = register(&db, "jake");
    let repo = SqliteUserRepository::new(db);

    let patch = UserPatch {
        email: Some("jane@conduit.test".to_string()),
        ..UserPatch::default()
    };
    let err = repo
        .update(&CancelToken::new(), &mut jake, &patch)
        .unwrap_err();

    assert!(matches!(err, RepoError::Internal(_)));
    assert_eq!(jake.email, "jake@conduit.test");
}

#[test]
fn authenticate_hides_whether_email_exists() {
    let db = open_db_in_memory().unwrap();
    let service = UserService::new(SqliteUserRepository::new(db), plain_verifier);
    let cancel = CancelToken::new();
    let registered = service.register(&cancel, &new_user("jake")).unwrap();

    let user = service
        .authenticate(&cancel, "jake@conduit.test", "jake-secret")
        .unwrap();
    assert_eq!(user.id, registered.id);

    let wrong_password = service
        .authenticate(&cancel, "jake@conduit.test", "guess")
        .unwrap_err();
    assert!(matches!(wrong_password, RepoError::Unauthorized));

    let unknown_email = service
        .authenticate(&cancel, "nobody@conduit.test", "jake-secret")
        .unwrap_err();
    assert!(matches!(unknown_email, RepoError::Unauthorized));
}

#[test]
fn service_update_returns_new_timestamp() {
    let db = open_db_in_memory().unwrap();
    let service = UserService::new(SqliteUserRepository::new(db), plain_verifier);
    let cancel = CancelToken::new();
    let mut user = service.register(&cancel, &new_user("jake")).unwrap();

    let updated_at = service
        .update_user(
            &cancel,
            &mut user,
            &UserPatch {
                bio: Some("new bio".to_string()),
                ..UserPatch::default()
            },
        )
        .unwrap();

    let reloaded = service.user_by_email(&cancel, "jake@conduit.test").unwrap();
    assert_eq!(reloaded.bio, "new bio");
    assert_eq!(reloaded.updated_at, updated_at);
}
