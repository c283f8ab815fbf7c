use inkpress_core::db::open_db_in_memory;
use inkpress_core::{
    NewPost, NewUser, PostRepository, PostService, PostServiceError, RepoError,
    SqlitePostRepository, SqliteTagRepository, SqliteUserRepository, Tag, TagRepository, User,
    UserRepository,
};
use rusqlite::Connection;
use std::collections::HashSet;
use uuid::Uuid;

#[test]
fn ensure_tags_upserts_once_per_unique_name() {
    let conn = open_db_in_memory().unwrap();
    let tags = SqliteTagRepository::new(&conn);

    let names = vec!["#a".to_string(), "#a".to_string(), "#b".to_string()];
    let first = tags.ensure_tags(&names).unwrap();
    assert_eq!(first.len(), 2);

    let second = tags.ensure_tags(&names).unwrap();
    assert_eq!(second, first, "re-ensuring must return the same identities");
    assert_eq!(count_rows(&conn, "tags"), 2);
}

#[test]
fn ensure_tags_empty_input_issues_no_queries() {
    let conn = open_db_in_memory().unwrap();
    let tags = SqliteTagRepository::new(&conn);

    let ensured = tags.ensure_tags(&[]).unwrap();
    assert!(ensured.is_empty());
    assert_eq!(count_rows(&conn, "tags"), 0);
}

#[test]
fn linking_twice_leaves_one_join_row_per_pair() {
    let conn = open_db_in_memory().unwrap();
    let author = seed_user(&conn, "albert");
    let post = seed_post(&conn, &author, "tagged");
    let tags = SqliteTagRepository::new(&conn);

    let ensured = tags
        .ensure_tags(&["#x".to_string(), "#y".to_string()])
        .unwrap();
    tags.link_post_to_tags(post.id, &ensured).unwrap().unwrap();
    tags.link_post_to_tags(post.id, &ensured).unwrap().unwrap();

    assert_eq!(count_rows(&conn, "post_tags"), 2);
}

#[test]
fn hydration_returns_exact_tag_set_and_public_author() {
    let conn = open_db_in_memory().unwrap();
    let author = seed_user(&conn, "albert");
    let post = seed_post(&conn, &author, "tagged post");
    let tags = SqliteTagRepository::new(&conn);

    let ensured = tags
        .ensure_tags(&["#x".to_string(), "#y".to_string()])
        .unwrap();
    let detail = tags.link_post_to_tags(post.id, &ensured).unwrap().unwrap();

    let tag_names: HashSet<&str> = detail.tags.iter().map(|tag| tag.name.as_str()).collect();
    assert_eq!(tag_names, HashSet::from(["#x", "#y"]));
    assert_eq!(detail.author.id, author.id);
    assert_eq!(detail.author.username, "albert");
    assert_eq!(detail.author.location.as_deref(), Some("Sidney"));
}

#[test]
fn failing_link_aborts_the_whole_batch() {
    let conn = open_db_in_memory().unwrap();
    let author = seed_user(&conn, "albert");
    let post = seed_post(&conn, &author, "partial");
    let tags = SqliteTagRepository::new(&conn);

    let mut ensured = tags
        .ensure_tags(&["#t1".to_string(), "#t3".to_string()])
        .unwrap();
    // A tag id with no backing row makes the second insert fail mid-batch.
    ensured.insert(
        1,
        Tag {
            id: 9999,
            name: "#t2".to_string(),
        },
    );

    let err = tags.link_post_to_tags(post.id, &ensured).unwrap_err();
    assert!(matches!(err, RepoError::Db(_)));

    // The first pair landed before the failure; nothing after it did.
    assert_eq!(count_rows(&conn, "post_tags"), 1);
}

#[test]
fn posts_with_tag_returns_flat_rows() {
    let conn = open_db_in_memory().unwrap();
    let author = seed_user(&conn, "albert");
    let tagged = seed_post(&conn, &author, "tagged");
    let plain = seed_post(&conn, &author, "plain");
    let tags = SqliteTagRepository::new(&conn);
    let posts = SqlitePostRepository::new(&conn);

    let ensured = tags.ensure_tags(&["#only".to_string()]).unwrap();
    tags.link_post_to_tags(tagged.id, &ensured).unwrap().unwrap();

    let found = posts.posts_with_tag("#only").unwrap();
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].id, tagged.id);
    assert_ne!(found[0].id, plain.id);

    let json = serde_json::to_value(&found[0]).unwrap();
    assert!(json.get("tags").is_none());
    assert!(json.get("author_id").is_some());
}

#[test]
fn list_tags_returns_all_rows_sorted_by_name() {
    let conn = open_db_in_memory().unwrap();
    let tags = SqliteTagRepository::new(&conn);

    tags.ensure_tags(&["#zebra".to_string(), "#apple".to_string()])
        .unwrap();
    let listed = tags.list_tags().unwrap();
    let names: Vec<&str> = listed.iter().map(|tag| tag.name.as_str()).collect();
    assert_eq!(names, vec!["#apple", "#zebra"]);
}

#[test]
fn publish_post_links_tags_and_returns_hydrated_detail() {
    let conn = open_db_in_memory().unwrap();
    let author = seed_user(&conn, "albert");
    let service = PostService::new(
        SqlitePostRepository::new(&conn),
        SqliteTagRepository::new(&conn),
    );

    let detail = service
        .publish_post(
            &NewPost {
                author_id: author.id,
                title: "Launch".to_string(),
                content: "We are live".to_string(),
            },
            &["#news".to_string(), "#launch".to_string()],
        )
        .unwrap();

    let tag_names: HashSet<&str> = detail.tags.iter().map(|tag| tag.name.as_str()).collect();
    assert_eq!(tag_names, HashSet::from(["#news", "#launch"]));
    assert_eq!(detail.author.username, "albert");
}

#[test]
fn publish_post_rejects_blank_tags_before_any_insert() {
    let conn = open_db_in_memory().unwrap();
    let author = seed_user(&conn, "albert");
    let service = PostService::new(
        SqlitePostRepository::new(&conn),
        SqliteTagRepository::new(&conn),
    );

    let err = service
        .publish_post(
            &NewPost {
                author_id: author.id,
                title: "Never lands".to_string(),
                content: "body".to_string(),
            },
            &["#ok".to_string(), "   ".to_string()],
        )
        .unwrap_err();
    assert!(matches!(err, PostServiceError::InvalidTag(_)));

    assert_eq!(count_rows(&conn, "posts"), 0);
    assert_eq!(count_rows(&conn, "tags"), 0);
}

#[test]
fn tag_post_on_missing_post_reports_not_found() {
    let conn = open_db_in_memory().unwrap();
    let service = PostService::new(
        SqlitePostRepository::new(&conn),
        SqliteTagRepository::new(&conn),
    );

    let err = service.tag_post(Uuid::new_v4(), &[]).unwrap_err();
    assert!(matches!(err, PostServiceError::PostNotFound(_)));
}

fn seed_user(conn: &Connection, username: &str) -> User {
    SqliteUserRepository::new(conn)
        .create_user(&NewUser {
            username: username.to_string(),
            password: "bertie99".to_string(),
            name: Some("Al Bert".to_string()),
            location: Some("Sidney".to_string()),
        })
        .unwrap()
        .unwrap()
}

fn seed_post(conn: &Connection, author: &User, title: &str) -> inkpress_core::Post {
    SqlitePostRepository::new(conn)
        .create_post(&NewPost {
            author_id: author.id,
            title: title.to_string(),
            content: "body".to_string(),
        })
        .unwrap()
        .unwrap()
}

fn count_rows(conn: &Connection, table: &str) -> i64 {
    conn.query_row(&format!("SELECT COUNT(*) FROM {table};"), [], |row| {
        row.get(0)
    })
    .unwrap()
}
