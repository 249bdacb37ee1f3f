//! Typed rows of the fixture CSV files and how each one is inserted.
//!
//! Every record carries its own primary key. Foreign keys are plain ids
//! and are checked against the referenced table before the insert, so a
//! dangling reference is reported as such rather than as a constraint
//! violation.

use chrono::{Datelike, Utc};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use sqlx::PgPool;
use yamdb_core::roles::Role;
use yamdb_core::types::{DbId, Timestamp};
use yamdb_core::validation::{
    validate_email, validate_max_len, validate_not_blank, validate_score, validate_slug,
    validate_username, validate_year, CATALOGUE_NAME_MAX_LEN, PERSON_NAME_MAX_LEN,
    TITLE_NAME_MAX_LEN,
};
use yamdb_db::models::category::CreateCategory;
use yamdb_db::models::genre::CreateGenre;
use yamdb_db::models::title::CreateTitle;
use yamdb_db::models::user::CreateUser;
use yamdb_db::repositories::{
    CategoryRepo, CommentRepo, GenreRepo, ReviewRepo, TitleRepo, UserRepo,
};
use yamdb_db::{row_exists, Table};

use crate::error::RowError;

/// A CSV record that knows how to insert itself.
pub(crate) trait Import: DeserializeOwned {
    async fn import(&self, pool: &PgPool) -> Result<(), RowError>;

    /// Review score, collected for the load summary.
    fn score(&self) -> Option<i32> {
        None
    }
}

/// `users.csv`: `id,username,email,role,bio,first_name,last_name`.
#[derive(Debug, Deserialize)]
pub struct UserRecord {
    pub id: DbId,
    pub username: String,
    pub email: String,
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default)]
    pub bio: Option<String>,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
}

/// `category.csv`: `id,name,slug`.
#[derive(Debug, Deserialize)]
pub struct CategoryRecord {
    pub id: DbId,
    pub name: String,
    pub slug: String,
}

/// `genre.csv`: `id,name,slug`.
#[derive(Debug, Deserialize)]
pub struct GenreRecord {
    pub id: DbId,
    pub name: String,
    pub slug: String,
}

/// `titles.csv`: `id,name,year,category[,description]`.
#[derive(Debug, Deserialize)]
pub struct TitleRecord {
    pub id: DbId,
    pub name: String,
    pub year: i32,
    #[serde(default)]
    pub category: Option<DbId>,
    #[serde(default)]
    pub description: Option<String>,
}

/// `review.csv`: `id,title_id,text,author,score,pub_date`.
#[derive(Debug, Deserialize)]
pub struct ReviewRecord {
    pub id: DbId,
    pub title_id: DbId,
    pub text: String,
    pub author: DbId,
    pub score: i32,
    pub pub_date: Timestamp,
}

/// `comments.csv`: `id,review_id,text,author,pub_date`.
#[derive(Debug, Deserialize)]
pub struct CommentRecord {
    pub id: DbId,
    pub review_id: DbId,
    pub text: String,
    pub author: DbId,
    pub pub_date: Timestamp,
}

/// `genre_title.csv`: `id,title_id,genre_id`.
#[derive(Debug, Deserialize)]
pub struct GenreTitleRecord {
    pub id: DbId,
    pub title_id: DbId,
    pub genre_id: DbId,
}

async fn ensure_exists(pool: &PgPool, table: Table, id: DbId) -> Result<(), RowError> {
    if row_exists(pool, table, id).await? {
        Ok(())
    } else {
        Err(RowError::MissingReference {
            table: table.name(),
            id,
        })
    }
}

/// Whitespace-only cells count as empty.
fn blank_to_none(value: &Option<String>) -> Option<String> {
    value.as_ref().filter(|v| !v.trim().is_empty()).cloned()
}

impl Import for UserRecord {
    async fn import(&self, pool: &PgPool) -> Result<(), RowError> {
        validate_username(&self.username)?;
        validate_email(&self.email)?;

        let role = match blank_to_none(&self.role) {
            Some(role) => role.parse::<Role>()?,
            None => Role::User,
        };
        let first_name = blank_to_none(&self.first_name);
        let last_name = blank_to_none(&self.last_name);
        if let Some(name) = &first_name {
            validate_max_len("first_name", name, PERSON_NAME_MAX_LEN)?;
        }
        if let Some(name) = &last_name {
            validate_max_len("last_name", name, PERSON_NAME_MAX_LEN)?;
        }

        let input = CreateUser {
            username: self.username.clone(),
            email: self.email.clone(),
            first_name,
            last_name,
            bio: blank_to_none(&self.bio),
            role,
        };
        UserRepo::insert_with_id(pool, self.id, &input).await?;
        Ok(())
    }
}

impl Import for CategoryRecord {
    async fn import(&self, pool: &PgPool) -> Result<(), RowError> {
        validate_not_blank("name", &self.name)?;
        validate_max_len("name", &self.name, CATALOGUE_NAME_MAX_LEN)?;
        validate_slug(&self.slug)?;

        let input = CreateCategory {
            name: self.name.clone(),
            slug: self.slug.clone(),
        };
        CategoryRepo::insert_with_id(pool, self.id, &input).await?;
        Ok(())
    }
}

impl Import for GenreRecord {
    async fn import(&self, pool: &PgPool) -> Result<(), RowError> {
        validate_not_blank("name", &self.name)?;
        validate_max_len("name", &self.name, CATALOGUE_NAME_MAX_LEN)?;
        validate_slug(&self.slug)?;

        let input = CreateGenre {
            name: self.name.clone(),
            slug: self.slug.clone(),
        };
        GenreRepo::insert_with_id(pool, self.id, &input).await?;
        Ok(())
    }
}

impl Import for TitleRecord {
    async fn import(&self, pool: &PgPool) -> Result<(), RowError> {
        validate_not_blank("name", &self.name)?;
        validate_max_len("name", &self.name, TITLE_NAME_MAX_LEN)?;
        validate_year(self.year, Utc::now().year())?;
        if let Some(category_id) = self.category {
            ensure_exists(pool, Table::Categories, category_id).await?;
        }

        let input = CreateTitle {
            name: self.name.clone(),
            year: self.year,
            description: blank_to_none(&self.description),
            category_id: self.category,
            genre_ids: Vec::new(),
        };
        TitleRepo::insert_with_id(pool, self.id, &input).await?;
        Ok(())
    }
}

impl Import for ReviewRecord {
    async fn import(&self, pool: &PgPool) -> Result<(), RowError> {
        validate_not_blank("text", &self.text)?;
        validate_score(self.score)?;
        ensure_exists(pool, Table::Titles, self.title_id).await?;
        ensure_exists(pool, Table::Users, self.author).await?;

        ReviewRepo::insert_with_id(
            pool,
            self.id,
            self.title_id,
            self.author,
            &self.text,
            self.score,
            self.pub_date,
        )
        .await?;
        Ok(())
    }

    fn score(&self) -> Option<i32> {
        Some(self.score)
    }
}

impl Import for CommentRecord {
    async fn import(&self, pool: &PgPool) -> Result<(), RowError> {
        validate_not_blank("text", &self.text)?;
        ensure_exists(pool, Table::Reviews, self.review_id).await?;
        ensure_exists(pool, Table::Users, self.author).await?;

        CommentRepo::insert_with_id(
            pool,
            self.id,
            self.review_id,
            self.author,
            &self.text,
            self.pub_date,
        )
        .await?;
        Ok(())
    }
}

impl Import for GenreTitleRecord {
    async fn import(&self, pool: &PgPool) -> Result<(), RowError> {
        ensure_exists(pool, Table::Titles, self.title_id).await?;
        ensure_exists(pool, Table::Genres, self.genre_id).await?;

        GenreRepo::link_title_with_id(pool, self.id, self.title_id, self.genre_id).await?;
        Ok(())
    }
}
