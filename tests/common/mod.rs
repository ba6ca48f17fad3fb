#![allow(dead_code)]

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::{Extension, Router};
use chrono::{DateTime, Days, NaiveDate, TimeZone, Utc};
use sea_orm::{ActiveModelTrait, Database, DatabaseConnection, DbErr, EntityTrait, Schema};
use sea_orm_migration::prelude::*;
use serde_json::Value;
use tower::ServiceExt;
use uuid::Uuid;

use trailquery::auth::{AuthContext, capability};
use trailquery::entities::{
    activity_log, amenity, company, group_hike, media, region, trail, trail_amenity, user, user_role,
};

pub const BATCH: &str = "67e55044-10b1-426f-9247-bb680e5fe0c8";

/// Route `tracing` output through the test harness; later calls are no-ops.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_target(false)
        .compact()
        .try_init();
}

pub async fn setup_test_db() -> Result<DatabaseConnection, DbErr> {
    init_tracing();
    let db = Database::connect("sqlite::memory:").await?;

    // Run migrations
    Migrator::up(&db, None).await?;

    Ok(db)
}

/// Schema plus the fixture data every test file shares.
pub async fn setup_seeded_db() -> Result<DatabaseConnection, DbErr> {
    let db = setup_test_db().await?;
    seed(&db).await?;
    Ok(db)
}

pub fn setup_test_app(db: DatabaseConnection, auth: Option<AuthContext>) -> Router {
    let app = trailquery::router(db);
    match auth {
        Some(auth) => app.layer(Extension(auth)),
        None => app,
    }
}

/// A caller holding every capability.
pub fn admin() -> AuthContext {
    [
        capability::DELETE_TRAILS,
        capability::VIEW_ALL_TRAILS,
        capability::VIEW_ALL_GROUP_HIKES,
        capability::DELETE_MEDIA,
        capability::VIEW_ALL_MEDIA,
        capability::DELETE_USERS,
        capability::VIEW_ALL_USERS,
    ]
    .into_iter()
    .fold(AuthContext::user(1), |auth, capability| auth.with_capability(capability))
}

pub async fn get_json(app: &Router, uri: &str) -> (StatusCode, Value) {
    let request = Request::builder()
        .method("GET")
        .uri(uri)
        .body(Body::empty())
        .unwrap();
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json = serde_json::from_slice(&body).unwrap_or(Value::Null);
    (status, json)
}

/// Values of `field` across a page's `data`, in order.
pub fn field(page: &Value, field: &str) -> Vec<String> {
    page["data"]
        .as_array()
        .map(|rows| {
            rows.iter()
                .map(|row| match &row[field] {
                    Value::String(text) => text.clone(),
                    other => other.to_string(),
                })
                .collect()
        })
        .unwrap_or_default()
}

pub fn at(day: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 1, day, 10, 0, 0).unwrap()
}

pub fn today() -> NaiveDate {
    Utc::now().date_naive()
}

fn days_from_today(offset: i64) -> NaiveDate {
    let days = Days::new(offset.unsigned_abs());
    if offset >= 0 {
        today().checked_add_days(days).unwrap()
    } else {
        today().checked_sub_days(days).unwrap()
    }
}

pub async fn seed(db: &DatabaseConnection) -> Result<(), DbErr> {
    for (id, name, slug) in [(1, "Bernese Oberland", "bernese-oberland"), (2, "Valais", "valais")] {
        region::ActiveModel::from(region::Model {
            id,
            name: name.to_string(),
            slug: slug.to_string(),
        })
        .reset_all()
        .insert(db)
        .await?;
    }

    for (id, name, slug) in [(1, "Parking", "parking"), (2, "Toilets", "toilets"), (3, "Water", "water")] {
        amenity::ActiveModel::from(amenity::Model {
            id,
            name: name.to_string(),
            slug: slug.to_string(),
        })
        .reset_all()
        .insert(db)
        .await?;
    }

    for (id, name, slug) in [(1, "Alpine Guides", "alpine-guides"), (2, "Summit Co", "summit-co")] {
        company::ActiveModel::from(company::Model {
            id,
            name: name.to_string(),
            slug: slug.to_string(),
        })
        .reset_all()
        .insert(db)
        .await?;
    }

    seed_trails(db).await?;
    seed_group_hikes(db).await?;
    seed_media(db).await?;
    seed_users(db).await?;
    seed_activity_log(db).await?;
    Ok(())
}

struct TrailRow {
    id: i32,
    name: &'static str,
    slug: &'static str,
    status: &'static str,
    difficulty: &'static str,
    region_id: Option<i32>,
    created_by: i32,
    distance_km: f64,
    duration: (&'static str, f64, Option<f64>),
    coordinates: (f64, f64),
    deleted: bool,
}

async fn seed_trails(db: &DatabaseConnection) -> Result<(), DbErr> {
    let rows = [
        TrailRow {
            id: 1,
            name: "Eiger Trail",
            slug: "eiger-trail",
            status: "published",
            difficulty: "hard",
            region_id: Some(1),
            created_by: 10,
            distance_km: 6.0,
            duration: ("hours", 2.0, None),
            coordinates: (46.58, 8.0),
            deleted: false,
        },
        TrailRow {
            id: 2,
            name: "Aletsch Panorama",
            slug: "aletsch-panorama",
            status: "published",
            difficulty: "moderate",
            region_id: Some(2),
            created_by: 11,
            distance_km: 12.0,
            duration: ("hours", 6.0, None),
            coordinates: (46.43, 8.08),
            deleted: false,
        },
        TrailRow {
            id: 3,
            name: "Haute Route",
            slug: "haute-route",
            status: "draft",
            difficulty: "expert",
            region_id: Some(2),
            created_by: 10,
            distance_km: 20.0,
            duration: ("days", 1.0, None),
            coordinates: (46.0, 7.5),
            deleted: false,
        },
        TrailRow {
            id: 4,
            name: "Lake Walk",
            slug: "lake-walk",
            status: "archived",
            difficulty: "easy",
            region_id: Some(1),
            created_by: 11,
            distance_km: 4.5,
            duration: ("hours", 2.0, Some(10.0)),
            coordinates: (47.05, 8.3),
            deleted: false,
        },
        TrailRow {
            id: 5,
            name: "Via Alpina Stage",
            slug: "via-alpina-stage",
            status: "published",
            difficulty: "hard",
            region_id: None,
            created_by: 12,
            distance_km: 100.0,
            duration: ("days", 5.0, Some(7.0)),
            coordinates: (46.6, 9.0),
            deleted: false,
        },
        TrailRow {
            id: 6,
            name: "Closed Gorge",
            slug: "closed-gorge",
            status: "published",
            difficulty: "moderate",
            region_id: Some(1),
            created_by: 10,
            distance_km: 3.0,
            duration: ("hours", 3.0, None),
            coordinates: (46.7, 7.9),
            deleted: true,
        },
    ];

    for row in rows {
        let day = <u32 as TryFrom<_>>::try_from(row.id).unwrap();
        trail::ActiveModel::from(trail::Model {
            id: row.id,
            name: row.name.to_string(),
            slug: row.slug.to_string(),
            description: Some(format!("{} description", row.name)),
            status: row.status.to_string(),
            difficulty: row.difficulty.to_string(),
            region_id: row.region_id,
            created_by: Some(row.created_by),
            distance_km: Some(row.distance_km),
            duration_min: Some(row.duration.1),
            duration_max: row.duration.2,
            duration_type: row.duration.0.to_string(),
            latitude: Some(row.coordinates.0),
            longitude: Some(row.coordinates.1),
            created_at: at(day),
            deleted_at: row.deleted.then(|| at(28)),
        })
        .reset_all()
        .insert(db)
        .await?;
    }

    let pivot = [(1, 1), (1, 2), (2, 1), (3, 2), (3, 3), (4, 1), (4, 2), (4, 3), (6, 1), (6, 2)];
    trail_amenity::Entity::insert_many(pivot.into_iter().map(|(trail_id, amenity_id)| {
        trail_amenity::ActiveModel::from(trail_amenity::Model { trail_id, amenity_id }).reset_all()
    }))
    .exec_without_returning(db)
    .await?;
    Ok(())
}

async fn seed_group_hikes(db: &DatabaseConnection) -> Result<(), DbErr> {
    let rows = [
        (1, "Eiger Sunrise", "published", 10, Some(1), Some(1), Some(1), 10, Some(50.0), true),
        (2, "Aletsch Glacier Day", "published", 11, Some(2), Some(2), Some(2), 20, None, false),
        (3, "Free Lake Stroll", "published", 10, None, Some(4), Some(1), 5, Some(0.0), false),
        (4, "Past Haute Route", "published", 11, Some(1), Some(3), Some(2), -10, Some(120.0), false),
        (5, "Draft Via Alpina", "draft", 10, Some(2), Some(5), None, 30, Some(80.0), false),
    ];
    for (id, title, status, organizer_id, company_id, trail_id, region_id, offset, price, is_featured) in rows {
        group_hike::ActiveModel::from(group_hike::Model {
            id,
            title: title.to_string(),
            slug: title.to_lowercase().replace(' ', "-"),
            description: None,
            status: status.to_string(),
            organizer_id,
            company_id,
            trail_id,
            region_id,
            start_date: days_from_today(offset),
            price,
            is_featured,
            created_at: at(<u32 as TryFrom<_>>::try_from(id).unwrap()),
        })
        .reset_all()
        .insert(db)
        .await?;
    }
    Ok(())
}

/// 22 images uploaded by user 10, then 3 videos by user 11 (one deleted).
async fn seed_media(db: &DatabaseConnection) -> Result<(), DbErr> {
    for id in 1..=25 {
        let (media_type, uploaded_by) = if id <= 22 { ("image", 10) } else { ("video", 11) };
        media::ActiveModel::from(media::Model {
            id,
            name: format!("Asset {id:02}"),
            file_name: format!("asset-{id:02}.bin"),
            mime_type: "application/octet-stream".to_string(),
            media_type: media_type.to_string(),
            size: i64::from(id) * 1024,
            uploaded_by: Some(uploaded_by),
            created_at: at(<u32 as TryFrom<_>>::try_from(id).unwrap()),
            deleted_at: (id == 25).then(|| at(28)),
        })
        .reset_all()
        .insert(db)
        .await?;
    }
    Ok(())
}

async fn seed_users(db: &DatabaseConnection) -> Result<(), DbErr> {
    let rows = [
        (1, "Anna Keller", "anna@example.com", "active", Some(1), None),
        (2, "Bruno Meier", "bruno@example.com", "active", Some(2), Some(1)),
        (3, "Carla Rossi", "carla@example.org", "suspended", Some(1), Some(1)),
        (4, "Dario Frei", "dario@example.org", "inactive", None, Some(2)),
    ];
    for (id, name, email, status, company_id, created_by) in rows {
        user::ActiveModel::from(user::Model {
            id,
            name: name.to_string(),
            email: email.to_string(),
            status: status.to_string(),
            company_id,
            created_by,
            created_at: at(<u32 as TryFrom<_>>::try_from(id).unwrap()),
            deleted_at: None,
        })
        .reset_all()
        .insert(db)
        .await?;
    }

    let roles = [(1, 1), (2, 2), (3, 1), (3, 2), (4, 3)];
    user_role::Entity::insert_many(roles.into_iter().map(|(user_id, role_id)| {
        user_role::ActiveModel::from(user_role::Model { user_id, role_id }).reset_all()
    }))
    .exec_without_returning(db)
    .await?;
    Ok(())
}

async fn seed_activity_log(db: &DatabaseConnection) -> Result<(), DbErr> {
    let batch = Uuid::parse_str(BATCH).unwrap();
    let rows = [
        (1, "trails", "created", "trail", 1, 10, Some(batch)),
        (2, "trails", "updated", "trail", 1, 11, Some(batch)),
        (3, "media", "deleted", "media", 25, 11, None),
        (4, "users", "created", "user", 4, 2, None),
    ];
    for (id, log_name, event, subject_type, subject_id, causer_id, batch_uuid) in rows {
        activity_log::ActiveModel::from(activity_log::Model {
            id,
            log_name: Some(log_name.to_string()),
            description: format!("{subject_type} {subject_id} {event}"),
            event: Some(event.to_string()),
            subject_type: Some(subject_type.to_string()),
            subject_id: Some(subject_id),
            causer_type: Some("user".to_string()),
            causer_id: Some(causer_id),
            batch_uuid,
            created_at: at(<u32 as TryFrom<_>>::try_from(id).unwrap()),
        })
        .reset_all()
        .insert(db)
        .await?;
    }
    Ok(())
}

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![Box::new(CreateListingTables)]
    }
}

pub struct CreateListingTables;

impl MigrationName for CreateListingTables {
    fn name(&self) -> &'static str {
        "m20260101_000001_create_listing_tables"
    }
}

#[async_trait::async_trait]
impl MigrationTrait for CreateListingTables {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let schema = Schema::new(manager.get_database_backend());
        manager.create_table(schema.create_table_from_entity(region::Entity)).await?;
        manager.create_table(schema.create_table_from_entity(amenity::Entity)).await?;
        manager.create_table(schema.create_table_from_entity(company::Entity)).await?;
        manager.create_table(schema.create_table_from_entity(trail::Entity)).await?;
        manager.create_table(schema.create_table_from_entity(trail_amenity::Entity)).await?;
        manager.create_table(schema.create_table_from_entity(group_hike::Entity)).await?;
        manager.create_table(schema.create_table_from_entity(media::Entity)).await?;
        manager.create_table(schema.create_table_from_entity(user::Entity)).await?;
        manager.create_table(schema.create_table_from_entity(user_role::Entity)).await?;
        manager.create_table(schema.create_table_from_entity(activity_log::Entity)).await?;
        Ok(())
    }
}
