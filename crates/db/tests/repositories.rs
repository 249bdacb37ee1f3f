//! Integration tests for the repository layer against a real database.
//!
//! - User CRUD, search and confirmation-code bookkeeping
//! - Title detail assembly (category, genres, rating)
//! - Constraint behaviour (one review per author and title, restricted
//!   category delete, cascades)
//! - Explicit-id inserts followed by sequence synchronisation

use assert_matches::assert_matches;
use chrono::{Duration, Utc};
use sqlx::PgPool;
use yamdb_core::pagination::PageRequest;
use yamdb_core::roles::Role;
use yamdb_db::models::category::CreateCategory;
use yamdb_db::models::genre::CreateGenre;
use yamdb_db::models::title::{CreateTitle, TitleFilter, UpdateTitle};
use yamdb_db::models::user::{CreateUser, UpdateUser, User};
use yamdb_db::repositories::{
    CategoryRepo, CommentRepo, GenreRepo, ReviewRepo, TitleRepo, UserRepo,
};
use yamdb_db::Table;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

async fn new_user(pool: &PgPool, username: &str) -> User {
    UserRepo::create(pool, &CreateUser::signup(username, &format!("{username}@test.com")))
        .await
        .expect("user creation should succeed")
}

async fn new_title(pool: &PgPool, name: &str, category_id: Option<i64>, genre_ids: Vec<i64>) -> i64 {
    let input = CreateTitle {
        name: name.to_string(),
        year: 1999,
        description: None,
        category_id,
        genre_ids,
    };
    TitleRepo::create(pool, &input)
        .await
        .expect("title creation should succeed")
        .id
}

fn first_page() -> PageRequest {
    PageRequest::new(None, 10)
}

fn constraint_of(err: &sqlx::Error) -> Option<String> {
    match err {
        sqlx::Error::Database(db) => db.constraint().map(str::to_string),
        _ => None,
    }
}

// ---------------------------------------------------------------------------
// Users
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_user_defaults_and_lookup(pool: PgPool) {
    let user = new_user(&pool, "alice").await;
    assert_eq!(user.role(), Role::User);
    assert!(!user.is_superuser);
    assert!(user.confirmation_code_hash.is_none());

    let by_name = UserRepo::find_by_username(&pool, "alice").await.unwrap();
    assert_eq!(by_name.map(|u| u.id), Some(user.id));

    let by_email = UserRepo::find_by_email(&pool, "alice@test.com").await.unwrap();
    assert_eq!(by_email.map(|u| u.id), Some(user.id));
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_duplicate_username_violates_unique(pool: PgPool) {
    new_user(&pool, "bob").await;
    let err = UserRepo::create(&pool, &CreateUser::signup("bob", "other@test.com"))
        .await
        .unwrap_err();
    assert_eq!(constraint_of(&err).as_deref(), Some("uq_users_username"));
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_user_search_and_ordering(pool: PgPool) {
    for name in ["zed", "anna", "hannah", "bob"] {
        new_user(&pool, name).await;
    }

    let (all, count) = UserRepo::list(&pool, None, first_page()).await.unwrap();
    assert_eq!(count, 4);
    let names: Vec<_> = all.iter().map(|u| u.username.as_str()).collect();
    assert_eq!(names, ["anna", "bob", "hannah", "zed"]);

    let (found, count) = UserRepo::list(&pool, Some("ANN"), first_page()).await.unwrap();
    assert_eq!(count, 2);
    assert_eq!(found[0].username, "anna");
    assert_eq!(found[1].username, "hannah");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_user_partial_update(pool: PgPool) {
    let user = new_user(&pool, "carol").await;
    let update = UpdateUser {
        bio: Some("Film buff".into()),
        role: Some(Role::Moderator),
        ..Default::default()
    };
    let updated = UserRepo::update(&pool, user.id, &update).await.unwrap().unwrap();
    assert_eq!(updated.bio.as_deref(), Some("Film buff"));
    assert_eq!(updated.role(), Role::Moderator);
    assert_eq!(updated.email, "carol@test.com");

    assert!(UserRepo::update(&pool, 999_999, &update).await.unwrap().is_none());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_confirmation_code_is_consumed_once(pool: PgPool) {
    let user = new_user(&pool, "dave").await;
    let expires = Utc::now() + Duration::hours(1);
    UserRepo::set_confirmation_code(&pool, user.id, "digest", expires)
        .await
        .unwrap();

    let stored = UserRepo::find_by_id(&pool, user.id).await.unwrap().unwrap();
    assert_eq!(stored.confirmation_code_hash.as_deref(), Some("digest"));

    assert!(UserRepo::consume_confirmation_code(&pool, user.id, "digest").await.unwrap());
    assert!(!UserRepo::consume_confirmation_code(&pool, user.id, "digest").await.unwrap());

    let cleared = UserRepo::find_by_id(&pool, user.id).await.unwrap().unwrap();
    assert!(cleared.confirmation_code_hash.is_none());
    assert!(cleared.confirmation_code_expires_at.is_none());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_upsert_superuser_promotes_existing(pool: PgPool) {
    let user = new_user(&pool, "root").await;
    let promoted = UserRepo::upsert_superuser(&pool, "root", "root@test.com")
        .await
        .unwrap();
    assert_eq!(promoted.id, user.id);
    assert!(promoted.is_superuser);
    assert_eq!(promoted.role(), Role::Admin);
}

// ---------------------------------------------------------------------------
// Categories and genres
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_category_delete_is_restricted_while_referenced(pool: PgPool) {
    let category = CategoryRepo::create(
        &pool,
        &CreateCategory { name: "Films".into(), slug: "films".into() },
    )
    .await
    .unwrap();
    let title_id = new_title(&pool, "Alien", Some(category.id), vec![]).await;

    let err = CategoryRepo::delete_by_slug(&pool, "films").await.unwrap_err();
    assert_eq!(constraint_of(&err).as_deref(), Some("fk_titles_category"));

    TitleRepo::delete(&pool, title_id).await.unwrap();
    assert!(CategoryRepo::delete_by_slug(&pool, "films").await.unwrap());
    assert!(!CategoryRepo::delete_by_slug(&pool, "films").await.unwrap());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_genre_slugs_resolve_and_search(pool: PgPool) {
    for (name, slug) in [("Drama", "drama"), ("Comedy", "comedy"), ("Rock", "rock")] {
        GenreRepo::create(&pool, &CreateGenre { name: name.into(), slug: slug.into() })
            .await
            .unwrap();
    }

    let found = GenreRepo::find_by_slugs(&pool, &["rock".into(), "drama".into(), "nope".into()])
        .await
        .unwrap();
    let slugs: Vec<_> = found.iter().map(|g| g.slug.as_str()).collect();
    assert_eq!(slugs, ["drama", "rock"]);

    let (matches, count) = GenreRepo::list(&pool, Some("com"), first_page()).await.unwrap();
    assert_eq!(count, 1);
    assert_eq!(matches[0].slug, "comedy");
}

// ---------------------------------------------------------------------------
// Titles
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_title_detail_includes_category_genres_and_rating(pool: PgPool) {
    let category = CategoryRepo::create(
        &pool,
        &CreateCategory { name: "Books".into(), slug: "books".into() },
    )
    .await
    .unwrap();
    let fantasy = GenreRepo::create(&pool, &CreateGenre { name: "Fantasy".into(), slug: "fantasy".into() })
        .await
        .unwrap();
    let epic = GenreRepo::create(&pool, &CreateGenre { name: "Epic".into(), slug: "epic".into() })
        .await
        .unwrap();

    let title_id = new_title(&pool, "The Hobbit", Some(category.id), vec![fantasy.id, epic.id]).await;

    let detail = TitleRepo::find_detail(&pool, title_id).await.unwrap().unwrap();
    assert_eq!(detail.rating, None);
    assert_eq!(detail.category.as_ref().map(|c| c.slug.as_str()), Some("books"));
    let genre_slugs: Vec<_> = detail.genre.iter().map(|g| g.slug.as_str()).collect();
    assert_eq!(genre_slugs, ["epic", "fantasy"]);

    for (name, score) in [("r1", 10), ("r2", 9), ("r3", 9)] {
        let user = new_user(&pool, name).await;
        ReviewRepo::create(&pool, title_id, user.id, "text", score).await.unwrap();
    }

    let detail = TitleRepo::find_detail(&pool, title_id).await.unwrap().unwrap();
    assert_eq!(detail.rating, Some(9.3));

    let scores = ReviewRepo::scores_for_title(&pool, title_id).await.unwrap();
    assert_eq!(yamdb_core::rating::average_score(&scores), detail.rating);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_title_filters(pool: PgPool) {
    let films = CategoryRepo::create(&pool, &CreateCategory { name: "Films".into(), slug: "films".into() })
        .await
        .unwrap();
    let drama = GenreRepo::create(&pool, &CreateGenre { name: "Drama".into(), slug: "drama".into() })
        .await
        .unwrap();

    new_title(&pool, "Casablanca", Some(films.id), vec![drama.id]).await;
    new_title(&pool, "Casino", None, vec![]).await;
    new_title(&pool, "Heat", Some(films.id), vec![]).await;

    let by_category = TitleFilter { category: Some("films".into()), ..Default::default() };
    let (_, count) = TitleRepo::list(&pool, &by_category, first_page()).await.unwrap();
    assert_eq!(count, 2);

    let by_genre = TitleFilter { genre: Some("drama".into()), ..Default::default() };
    let (titles, _) = TitleRepo::list(&pool, &by_genre, first_page()).await.unwrap();
    assert_eq!(titles.len(), 1);
    assert_eq!(titles[0].name, "Casablanca");

    let by_name = TitleFilter { name: Some("casi".into()), ..Default::default() };
    let (titles, _) = TitleRepo::list(&pool, &by_name, first_page()).await.unwrap();
    assert_eq!(titles.len(), 1);
    assert_eq!(titles[0].name, "Casino");

    let by_year = TitleFilter { year: Some(2001), ..Default::default() };
    let (_, count) = TitleRepo::list(&pool, &by_year, first_page()).await.unwrap();
    assert_eq!(count, 0);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_search_treats_wildcards_literally(pool: PgPool) {
    for (name, slug) in [("Films", "films"), ("Books", "books"), ("50% off", "sale")] {
        CategoryRepo::create(&pool, &CreateCategory { name: name.into(), slug: slug.into() })
            .await
            .unwrap();
    }

    let (_, count) = CategoryRepo::list(&pool, Some("_"), first_page()).await.unwrap();
    assert_eq!(count, 0);

    let (found, count) = CategoryRepo::list(&pool, Some("%"), first_page()).await.unwrap();
    assert_eq!(count, 1);
    assert_eq!(found[0].slug, "sale");

    GenreRepo::create(&pool, &CreateGenre { name: "Sci_Fi".into(), slug: "sci-fi".into() })
        .await
        .unwrap();
    GenreRepo::create(&pool, &CreateGenre { name: "SciXFi".into(), slug: "scixfi".into() })
        .await
        .unwrap();
    let (found, count) = GenreRepo::list(&pool, Some("i_f"), first_page()).await.unwrap();
    assert_eq!(count, 1);
    assert_eq!(found[0].slug, "sci-fi");

    new_user(&pool, "ann_lee").await;
    new_user(&pool, "annxlee").await;
    let (found, count) = UserRepo::list(&pool, Some("n_l"), first_page()).await.unwrap();
    assert_eq!(count, 1);
    assert_eq!(found[0].username, "ann_lee");

    new_title(&pool, "a_b", None, vec![]).await;
    new_title(&pool, "axb", None, vec![]).await;
    let by_name = TitleFilter { name: Some("a_b".into()), ..Default::default() };
    let (titles, count) = TitleRepo::list(&pool, &by_name, first_page()).await.unwrap();
    assert_eq!(count, 1);
    assert_eq!(titles[0].name, "a_b");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_title_update_replaces_genres(pool: PgPool) {
    let a = GenreRepo::create(&pool, &CreateGenre { name: "A".into(), slug: "a".into() })
        .await
        .unwrap();
    let b = GenreRepo::create(&pool, &CreateGenre { name: "B".into(), slug: "b".into() })
        .await
        .unwrap();
    let title_id = new_title(&pool, "Shifting", None, vec![a.id]).await;

    let update = UpdateTitle { genre_ids: Some(vec![b.id]), year: Some(2000), ..Default::default() };
    let updated = TitleRepo::update(&pool, title_id, &update).await.unwrap().unwrap();
    assert_eq!(updated.year, 2000);
    assert_eq!(updated.name, "Shifting");

    let detail = TitleRepo::find_detail(&pool, title_id).await.unwrap().unwrap();
    let slugs: Vec<_> = detail.genre.iter().map(|g| g.slug.as_str()).collect();
    assert_eq!(slugs, ["b"]);
}

// ---------------------------------------------------------------------------
// Reviews and comments
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_one_review_per_author_and_title(pool: PgPool) {
    let user = new_user(&pool, "critic").await;
    let title_id = new_title(&pool, "Dune", None, vec![]).await;

    let review = ReviewRepo::create(&pool, title_id, user.id, "Great", 8).await.unwrap();
    assert_eq!(review.author, "critic");
    assert!(ReviewRepo::exists_for_author(&pool, title_id, user.id).await.unwrap());

    let err = ReviewRepo::create(&pool, title_id, user.id, "Again", 7).await.unwrap_err();
    assert_eq!(constraint_of(&err).as_deref(), Some("uq_reviews_author_title"));
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_score_check_constraint(pool: PgPool) {
    let user = new_user(&pool, "outlier").await;
    let title_id = new_title(&pool, "Zero", None, vec![]).await;
    let err = ReviewRepo::create(&pool, title_id, user.id, "Off the scale", 11)
        .await
        .unwrap_err();
    assert_eq!(constraint_of(&err).as_deref(), Some("ck_reviews_score"));
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_review_scoping_and_cascade(pool: PgPool) {
    let user = new_user(&pool, "writer").await;
    let title_a = new_title(&pool, "A", None, vec![]).await;
    let title_b = new_title(&pool, "B", None, vec![]).await;

    let review = ReviewRepo::create(&pool, title_a, user.id, "On A", 5).await.unwrap();
    assert!(ReviewRepo::find(&pool, title_a, review.id).await.unwrap().is_some());
    assert!(ReviewRepo::find(&pool, title_b, review.id).await.unwrap().is_none());

    let comment = CommentRepo::create(&pool, review.id, user.id, "Me too").await.unwrap();
    assert_eq!(comment.author, "writer");
    let (comments, count) = CommentRepo::list(&pool, review.id, first_page()).await.unwrap();
    assert_eq!(count, 1);
    assert_eq!(comments[0].text, "Me too");

    TitleRepo::delete(&pool, title_a).await.unwrap();
    assert!(ReviewRepo::find_view(&pool, review.id).await.unwrap().is_none());
    assert!(CommentRepo::find_view(&pool, comment.id).await.unwrap().is_none());
}

// ---------------------------------------------------------------------------
// Explicit-id inserts
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_sequence_sync_after_explicit_ids(pool: PgPool) {
    CategoryRepo::insert_with_id(
        &pool,
        50,
        &CreateCategory { name: "Music".into(), slug: "music".into() },
    )
    .await
    .unwrap();
    assert!(yamdb_db::row_exists(&pool, Table::Categories, 50).await.unwrap());
    assert!(!yamdb_db::row_exists(&pool, Table::Categories, 51).await.unwrap());

    yamdb_db::sync_id_sequence(&pool, Table::Categories).await.unwrap();

    let next = CategoryRepo::create(&pool, &CreateCategory { name: "Art".into(), slug: "art".into() })
        .await
        .unwrap();
    assert_eq!(next.id, 51);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_sequence_sync_on_empty_table(pool: PgPool) {
    assert_matches!(yamdb_db::sync_id_sequence(&pool, Table::Genres).await, Ok(()));
    let first = GenreRepo::create(&pool, &CreateGenre { name: "Jazz".into(), slug: "jazz".into() })
        .await
        .unwrap();
    assert_eq!(first.id, 1);
}
