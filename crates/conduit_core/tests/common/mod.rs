#![allow(dead_code)]

use conduit_core::{
    ArticleId, CancelToken, Database, NewUser, SqliteUserRepository, User, UserId, UserRepository,
};

pub fn new_user(username: &str) -> NewUser {
    NewUser {
        email: format!("{username}@conduit.test"),
        username: username.to_string(),
        bio: format!("bio of {username}"),
        image: String::new(),
        password_hash: format!("plain:{username}-secret"),
    }
}

pub fn register(db: &Database, username: &str) -> User {
    SqliteUserRepository::new(db.clone())
        .create(&CancelToken::new(), &new_user(username))
        .unwrap()
}

/// Test verifier: hashes are stored as `plain:<password>`.
pub fn plain_verifier(password_hash: &str, password: &str) -> bool {
    password_hash.strip_prefix("plain:") == Some(password)
}

pub fn follow(db: &Database, follower: UserId, followed: UserId) {
    db.write(&CancelToken::new(), "test_follow", |scope| {
        scope.execute(
            "INSERT INTO followings (follower_id, following_id) VALUES (?1, ?2)",
            [follower, followed],
        )?;
        Ok(())
    })
    .unwrap();
}

pub fn favorite(db: &Database, user: UserId, article: ArticleId) {
    db.write(&CancelToken::new(), "test_favorite", |scope| {
        scope.execute(
            "INSERT INTO favorites (user_id, article_id) VALUES (?1, ?2)",
            [user, article],
        )?;
        Ok(())
    })
    .unwrap();
}

pub fn set_created_at(db: &Database, article: ArticleId, created_at: i64) {
    db.write(&CancelToken::new(), "test_set_created_at", |scope| {
        scope.execute(
            "UPDATE articles SET created_at = ?1 WHERE id = ?2",
            [created_at, article],
        )?;
        Ok(())
    })
    .unwrap();
}

pub fn count_rows(db: &Database, table: &str) -> i64 {
    let sql = format!("SELECT COUNT(*) FROM {table}");
    db.read(&CancelToken::new(), "test_count", |scope| {
        scope.query_row(&sql, [], |row| row.get(0))
    })
    .unwrap()
}
