mod common;

use common::{count_rows, register};
use conduit_core::{
    open_db_in_memory, resolve_tag, ArticleRepository, CancelToken, NewArticle, RepoError,
    SqliteArticleRepository, SqliteTagRepository, TagFilter, TagRepository, TagResolution,
};

#[test]
fn resolve_creates_once_then_finds_within_one_transaction() {
    let db = open_db_in_memory().unwrap();

    let (first, second) = db
        .write(&CancelToken::new(), "test_resolve_tag", |scope| {
            let first = resolve_tag(scope, "rust")?;
            let second = resolve_tag(scope, "rust")?;
            Ok((first, second))
        })
        .unwrap();

    assert!(first.was_created());
    assert!(matches!(second, TagResolution::Found(_)));
    assert_eq!(first.tag(), second.tag());
    assert_eq!(count_rows(&db, "tags"), 1);
}

#[test]
fn resolve_finds_tag_committed_by_earlier_transaction() {
    let db = open_db_in_memory().unwrap();
    let cancel = CancelToken::new();

    let created = db
        .write(&cancel, "test_resolve_tag", |scope| resolve_tag(scope, "go"))
        .unwrap();
    let again = db
        .write(&cancel, "test_resolve_tag", |scope| resolve_tag(scope, "go"))
        .unwrap();

    assert!(created.was_created());
    assert!(!again.was_created());
    assert_eq!(created.into_tag().id, again.into_tag().id);
}

#[test]
fn find_by_name_reports_missing_tag() {
    let db = open_db_in_memory().unwrap();
    let repo = SqliteTagRepository::new(db);

    let err = repo.find_by_name(&CancelToken::new(), "absent").unwrap_err();
    assert!(matches!(err, RepoError::NotFound("tag")));
    assert_eq!(err.code(), "not_found");
}

#[test]
fn list_orders_by_id_and_honours_filters() {
    let db = open_db_in_memory().unwrap();
    let author = register(&db, "jake");
    SqliteArticleRepository::new(db.clone())
        .create(
            &CancelToken::new(),
            &NewArticle::new(author.id, "Tags", "body").with_tags(["zig", "ada", "c"]),
        )
        .unwrap();

    let repo = SqliteTagRepository::new(db);
    let cancel = CancelToken::new();

    let all = repo.list(&cancel, &TagFilter::default()).unwrap();
    let names: Vec<_> = all.iter().map(|tag| tag.name.as_str()).collect();
    assert_eq!(names, vec!["zig", "ada", "c"]);

    let limited = repo
        .list(
            &cancel,
            &TagFilter {
                limit: 2,
                offset: 1,
                ..TagFilter::default()
            },
        )
        .unwrap();
    let names: Vec<_> = limited.iter().map(|tag| tag.name.as_str()).collect();
    assert_eq!(names, vec!["ada", "c"]);

    let by_name = repo.list(&cancel, &TagFilter::by_name("c")).unwrap();
    assert_eq!(by_name.len(), 1);
    assert_eq!(repo.find_by_name(&cancel, "c").unwrap(), by_name[0]);
}
