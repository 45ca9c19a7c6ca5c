use crate::{
    models::{DistanceByLabel, DrivesByLabel, ExperienceRecord, LookupRow, MonthlyDistance, Overview},
    Error, Result,
};
use chrono::{DateTime, Utc};
use drivelog_core::{DateRange, DrivingExperience, LookupKind, NewExperience};
use sqlx::{postgres::PgPoolOptions, FromRow, Pool, Postgres, Row};

#[derive(Clone)]
pub struct Database {
    pool: Pool<Postgres>,
}

/// Raw fact row, before the road-type set is attached.
#[derive(FromRow)]
struct ExperienceRow {
    id: i64,
    drive_datetime: DateTime<Utc>,
    km: f64,
    notes: String,
    weather_id: i64,
    traffic_id: i64,
    supervisor_id: i64,
}

impl Database {
    /// Create new database connection
    pub async fn new(database_url: &str) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(5)
            .connect(database_url)
            .await?;

        Ok(Self { pool })
    }

    /// Initialize database schema
    pub async fn init_schema(&self) -> Result<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS weather (
                id BIGSERIAL PRIMARY KEY,
                label VARCHAR(100) NOT NULL UNIQUE
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS traffic (
                id BIGSERIAL PRIMARY KEY,
                label VARCHAR(100) NOT NULL UNIQUE
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS road_type (
                id BIGSERIAL PRIMARY KEY,
                label VARCHAR(100) NOT NULL UNIQUE
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS supervisor (
                id BIGSERIAL PRIMARY KEY,
                name VARCHAR(100) NOT NULL UNIQUE
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS driving_experience (
                id BIGSERIAL PRIMARY KEY,
                drive_datetime TIMESTAMPTZ NOT NULL,
                km DOUBLE PRECISION NOT NULL CHECK (km > 0),
                notes TEXT NOT NULL DEFAULT '',
                weather_id BIGINT NOT NULL REFERENCES weather(id),
                traffic_id BIGINT NOT NULL REFERENCES traffic(id),
                supervisor_id BIGINT NOT NULL REFERENCES supervisor(id)
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS experience_road_type (
                experience_id BIGINT NOT NULL
                    REFERENCES driving_experience(id) ON DELETE CASCADE,
                road_type_id BIGINT NOT NULL REFERENCES road_type(id),
                PRIMARY KEY (experience_id, road_type_id)
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        // Create indexes
        sqlx::query(
            "CREATE INDEX IF NOT EXISTS idx_experience_datetime \
             ON driving_experience(drive_datetime DESC)",
        )
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    // ========================================================================
    // Experience Operations
    // ========================================================================

    /// Insert a new experience and its road-type associations in one
    /// transaction; rolled back as a unit on any failure.
    pub async fn insert_experience(&self, exp: &NewExperience) -> Result<i64> {
        let mut tx = self.pool.begin().await?;

        let id: i64 = sqlx::query_scalar(
            r#"
            INSERT INTO driving_experience
                (drive_datetime, km, notes, weather_id, traffic_id, supervisor_id)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id
            "#,
        )
        .bind(exp.drive_datetime)
        .bind(exp.km)
        .bind(&exp.notes)
        .bind(exp.weather_id)
        .bind(exp.traffic_id)
        .bind(exp.supervisor_id)
        .fetch_one(&mut *tx)
        .await
        .map_err(classify)?;

        for road_type_id in &exp.road_type_ids {
            sqlx::query(
                "INSERT INTO experience_road_type (experience_id, road_type_id) VALUES ($1, $2)",
            )
            .bind(id)
            .bind(road_type_id)
            .execute(&mut *tx)
            .await
            .map_err(classify)?;
        }

        tx.commit().await?;

        tracing::info!("Recorded driving experience {} ({} km)", id, exp.km);

        Ok(id)
    }

    /// Update an experience, fully replacing its road-type set
    /// (delete then reinsert, same transaction).
    pub async fn update_experience(&self, id: i64, exp: &NewExperience) -> Result<()> {
        let mut tx = self.pool.begin().await?;

        let result = sqlx::query(
            r#"
            UPDATE driving_experience
            SET drive_datetime = $1,
                km = $2,
                notes = $3,
                weather_id = $4,
                traffic_id = $5,
                supervisor_id = $6
            WHERE id = $7
            "#,
        )
        .bind(exp.drive_datetime)
        .bind(exp.km)
        .bind(&exp.notes)
        .bind(exp.weather_id)
        .bind(exp.traffic_id)
        .bind(exp.supervisor_id)
        .bind(id)
        .execute(&mut *tx)
        .await
        .map_err(classify)?;

        if result.rows_affected() == 0 {
            return Err(Error::ExperienceNotFound(id));
        }

        sqlx::query("DELETE FROM experience_road_type WHERE experience_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        for road_type_id in &exp.road_type_ids {
            sqlx::query(
                "INSERT INTO experience_road_type (experience_id, road_type_id) VALUES ($1, $2)",
            )
            .bind(id)
            .bind(road_type_id)
            .execute(&mut *tx)
            .await
            .map_err(classify)?;
        }

        tx.commit().await?;

        tracing::info!("Updated driving experience {}", id);

        Ok(())
    }

    /// Delete an experience by id; join rows are removed by cascade.
    pub async fn delete_experience(&self, id: i64) -> Result<()> {
        let result = sqlx::query("DELETE FROM driving_experience WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(Error::ExperienceNotFound(id));
        }

        tracing::info!("Deleted driving experience {}", id);

        Ok(())
    }

    /// Get an experience with raw lookup ids (edit-form shape).
    pub async fn get_experience(&self, id: i64) -> Result<Option<DrivingExperience>> {
        let row = sqlx::query_as::<_, ExperienceRow>(
            r#"
            SELECT id, drive_datetime, km, notes, weather_id, traffic_id, supervisor_id
            FROM driving_experience
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        let Some(row) = row else {
            return Ok(None);
        };

        let road_type_ids: Vec<i64> = sqlx::query_scalar(
            "SELECT road_type_id FROM experience_road_type \
             WHERE experience_id = $1 ORDER BY road_type_id",
        )
        .bind(id)
        .fetch_all(&self.pool)
        .await?;

        Ok(Some(DrivingExperience {
            id: row.id,
            drive_datetime: row.drive_datetime,
            km: row.km,
            notes: row.notes,
            weather_id: row.weather_id,
            traffic_id: row.traffic_id,
            supervisor_id: row.supervisor_id,
            road_type_ids,
        }))
    }

    /// List experiences with lookup labels resolved, newest first, optionally
    /// restricted to an inclusive date range.
    pub async fn list_experiences(&self, range: &DateRange) -> Result<Vec<ExperienceRecord>> {
        let mut records = sqlx::query_as::<_, ExperienceRecord>(
            r#"
            SELECT
                de.id,
                de.drive_datetime,
                de.km,
                de.notes,
                w.label AS weather,
                t.label AS traffic,
                s.name AS supervisor
            FROM driving_experience de
            JOIN weather w ON de.weather_id = w.id
            JOIN traffic t ON de.traffic_id = t.id
            JOIN supervisor s ON de.supervisor_id = s.id
            WHERE ($1::timestamptz IS NULL OR de.drive_datetime >= $1)
              AND ($2::timestamptz IS NULL OR de.drive_datetime <= $2)
            ORDER BY de.drive_datetime DESC
            "#,
        )
        .bind(range.start_bound())
        .bind(range.end_bound())
        .fetch_all(&self.pool)
        .await?;

        for record in &mut records {
            record.road_types = sqlx::query_scalar(
                r#"
                SELECT rt.label
                FROM experience_road_type ert
                JOIN road_type rt ON ert.road_type_id = rt.id
                WHERE ert.experience_id = $1
                ORDER BY rt.label
                "#,
            )
            .bind(record.id)
            .fetch_all(&self.pool)
            .await?;
        }

        Ok(records)
    }

    // ========================================================================
    // Lookup Operations
    // ========================================================================

    /// List one lookup table, ordered by label. Table and column names come
    /// from the `LookupKind` whitelist, never from user input.
    pub async fn list_lookup(&self, kind: LookupKind) -> Result<Vec<LookupRow>> {
        let sql = format!(
            "SELECT id, {col} AS label FROM {table} ORDER BY label",
            col = kind.label_column(),
            table = kind.table(),
        );

        let rows = sqlx::query_as::<_, LookupRow>(&sql)
            .fetch_all(&self.pool)
            .await?;

        Ok(rows)
    }

    /// Append one lookup row. Lookup tables are append-only.
    pub async fn add_lookup(&self, kind: LookupKind, label: &str) -> Result<LookupRow> {
        let label = label.trim();

        let sql = format!(
            "INSERT INTO {table} ({col}) VALUES ($1) RETURNING id",
            col = kind.label_column(),
            table = kind.table(),
        );

        let id: i64 = sqlx::query_scalar(&sql)
            .bind(label)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| match &e {
                sqlx::Error::Database(db) if db.is_unique_violation() => {
                    Error::DuplicateLabel(label.to_string())
                }
                _ => Error::Sqlx(e),
            })?;

        tracing::info!("Added {} '{}' ({})", kind, label, id);

        Ok(LookupRow {
            id,
            label: label.to_string(),
        })
    }

    // ========================================================================
    // Aggregate Queries
    // ========================================================================

    /// Total distance over an inclusive date range; 0 when nothing matches.
    pub async fn total_distance(&self, range: &DateRange) -> Result<f64> {
        let total: f64 = sqlx::query_scalar(
            r#"
            SELECT COALESCE(SUM(km), 0)
            FROM driving_experience
            WHERE ($1::timestamptz IS NULL OR drive_datetime >= $1)
              AND ($2::timestamptz IS NULL OR drive_datetime <= $2)
            "#,
        )
        .bind(range.start_bound())
        .bind(range.end_bound())
        .fetch_one(&self.pool)
        .await?;

        Ok(total)
    }

    /// Distance per weather condition; zero-activity conditions still appear.
    pub async fn distance_by_weather(&self) -> Result<Vec<DistanceByLabel>> {
        let rows = sqlx::query_as::<_, DistanceByLabel>(
            r#"
            SELECT w.label, COALESCE(SUM(de.km), 0) AS total_km
            FROM weather w
            LEFT JOIN driving_experience de ON w.id = de.weather_id
            GROUP BY w.id, w.label
            ORDER BY total_km DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    /// Session count per road type, over the join table.
    pub async fn drives_by_road_type(&self) -> Result<Vec<DrivesByLabel>> {
        let rows = sqlx::query_as::<_, DrivesByLabel>(
            r#"
            SELECT rt.label, COUNT(ert.experience_id) AS drive_count
            FROM road_type rt
            LEFT JOIN experience_road_type ert ON rt.id = ert.road_type_id
            GROUP BY rt.id, rt.label
            ORDER BY drive_count DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    /// Distance per calendar month, oldest first.
    pub async fn distance_by_month(&self) -> Result<Vec<MonthlyDistance>> {
        let rows = sqlx::query_as::<_, MonthlyDistance>(
            r#"
            SELECT to_char(drive_datetime, 'YYYY-MM') AS month, SUM(km) AS total_km
            FROM driving_experience
            GROUP BY to_char(drive_datetime, 'YYYY-MM')
            ORDER BY month ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    /// Headline totals for the stats page.
    pub async fn overview(&self) -> Result<Overview> {
        let row = sqlx::query(
            r#"
            SELECT
                COALESCE(SUM(km), 0) AS total_km,
                COUNT(*) AS total_drives,
                COALESCE(AVG(km), 0) AS avg_km
            FROM driving_experience
            "#,
        )
        .fetch_one(&self.pool)
        .await?;

        Ok(Overview {
            total_km: row.get("total_km"),
            total_drives: row.get("total_drives"),
            avg_km: row.get("avg_km"),
        })
    }
}

/// Map constraint failures on experience writes to domain errors; a broken
/// lookup reference is a caller mistake, not a server fault.
fn classify(e: sqlx::Error) -> Error {
    match &e {
        sqlx::Error::Database(db) if db.is_foreign_key_violation() => Error::MissingReference,
        _ => Error::Sqlx(e),
    }
}
