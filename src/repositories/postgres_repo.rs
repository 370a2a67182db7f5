use std::sync::Arc;
use std::time::Duration;
use anyhow::Context;
use bb8_postgres::bb8::{Pool, PooledConnection};
use bb8_postgres::PostgresConnectionManager;
use bb8_postgres::tokio_postgres::tls::{MakeTlsConnect, TlsConnect};
use bb8_postgres::tokio_postgres::{NoTls, Row, Socket};
use futures::future::BoxFuture;
use futures::FutureExt;
use rustls::{ClientConfig, RootCertStore};
use tokio_postgres_rustls::MakeRustlsConnect;
use tracing::{error, info, warn};
use crate::config::Config;
use crate::models::booking::{Booking, BookingUpdate, NewBooking};
use crate::repositories::BookingRepository;

pub type PostgresPool<Tls = NoTls> = Pool<PostgresConnectionManager<Tls>>;

/// Opens the bookings store with TLS unless the config explicitly turns it off,
/// and checks connectivity in the background.
pub fn connect_booking_repo(config: &Config) -> anyhow::Result<Arc<dyn BookingRepository>> {
    if config.db_require_tls {
        let pool = build_pool(config, rustls_connector()?)?;
        Ok(spawn_with_version_check(PostgresConnectionRepo::new(pool)))
    } else {
        warn!("DB_REQUIRE_TLS is off, connecting to the bookings database without TLS");
        let pool = build_pool(config, NoTls)?;
        Ok(spawn_with_version_check(PostgresConnectionRepo::new(pool)))
    }
}

fn spawn_with_version_check<Tls>(repo: PostgresConnectionRepo<Tls>) -> Arc<dyn BookingRepository>
where
    Tls: MakeTlsConnect<Socket> + Clone + Send + Sync + 'static,
    Tls::Stream: Send + Sync,
    Tls::TlsConnect: Send,
    <Tls::TlsConnect as TlsConnect<Socket>>::Future: Send,
{
    let repo = Arc::new(repo);
    let version_repo = repo.clone();
    tokio::spawn(async move { version_repo.log_server_version().await });
    repo
}

/// rustls connector trusting the Mozilla root set.
pub fn rustls_connector() -> anyhow::Result<MakeRustlsConnect> {
    let mut roots = RootCertStore::empty();
    roots.extend(webpki_roots::TLS_SERVER_ROOTS.iter().cloned());

    let tls_config = ClientConfig::builder_with_provider(Arc::new(rustls::crypto::ring::default_provider()))
        .with_safe_default_protocol_versions()
        .context("Failed to configure TLS protocol versions")?
        .with_root_certificates(roots)
        .with_no_client_auth();

    Ok(MakeRustlsConnect::new(tls_config))
}

/// Builds the connection pool without connecting, so the process can come up
/// while the database is still unreachable.
pub fn build_pool<Tls>(config: &Config, tls: Tls) -> anyhow::Result<PostgresPool<Tls>>
where
    Tls: MakeTlsConnect<Socket> + Clone + Send + Sync + 'static,
    Tls::Stream: Send + Sync,
    Tls::TlsConnect: Send,
    <Tls::TlsConnect as TlsConnect<Socket>>::Future: Send,
{
    let manager = PostgresConnectionManager::new_from_stringlike(
        config.database_url.as_str(),
        tls,
    ).context("Invalid bookings database connection string")?;

    let pool = Pool::builder()
        .max_size(config.db_max_connections.max(1))
        .connection_timeout(Duration::from_secs(config.db_connection_timeout_secs))
        .build_unchecked(manager);

    Ok(pool)
}

pub struct PostgresConnectionRepo<Tls = NoTls>
where
    Tls: MakeTlsConnect<Socket> + Clone + Send + Sync + 'static,
    Tls::Stream: Send + Sync,
    Tls::TlsConnect: Send,
    <Tls::TlsConnect as TlsConnect<Socket>>::Future: Send,
{
    postgres_connection: PostgresPool<Tls>,
}

impl<Tls> PostgresConnectionRepo<Tls>
where
    Tls: MakeTlsConnect<Socket> + Clone + Send + Sync + 'static,
    Tls::Stream: Send + Sync,
    Tls::TlsConnect: Send,
    <Tls::TlsConnect as TlsConnect<Socket>>::Future: Send,
{
    pub fn new(
        postgres_connection: PostgresPool<Tls>,
    ) -> Self {
        Self {
            postgres_connection
        }
    }

    /// The pooled connection returns to the pool when dropped, on every exit path.
    /// When the pool is exhausted this waits in the pool queue up to `connection_timeout`.
    async fn get_postgres_connection(
        &self,
    ) -> anyhow::Result<PooledConnection<'_, PostgresConnectionManager<Tls>>> {
        self.postgres_connection
            .get()
            .await
            .map_err(|e| anyhow::anyhow!("Failed to retrieve a connection from the postgres pool: {}", e))
    }

    /// Startup connectivity check. Failure is logged, never fatal.
    pub async fn log_server_version(&self) {
        let res = async {
            let conn = self.get_postgres_connection().await?;
            let row = conn.query_one("SELECT version()", &[]).await?;
            anyhow::Ok(row.try_get::<_, String>(0)?)
        }.await;

        match res {
            Ok(version) => info!("Database connected: {}", version),
            Err(e) => error!("Database connection error: {:#}", e),
        }
    }

    async fn insert_booking(
        &self,
        booking: &NewBooking,
    ) -> anyhow::Result<i32> {
        let conn = self.get_postgres_connection().await?;
        let row = conn
            .query_one(
                "INSERT INTO bookings \
                (place_id, court_no, phone_no, email, user_id, start_time, end_time) \
                VALUES ($1, $2, $3, $4, $5, $6, $7) RETURNING id",
                &[
                    &booking.place_id,
                    &booking.court_no,
                    &booking.phone_no,
                    &booking.email,
                    &booking.user_id,
                    &booking.start_time,
                    &booking.end_time,
                ],
            )
            .await
            .context("Failed to insert booking")?;

        Ok(row.try_get("id")?)
    }

    async fn select_all_bookings(&self) -> anyhow::Result<Vec<Booking>> {
        let conn = self.get_postgres_connection().await?;
        let rows = conn
            .query("SELECT * FROM bookings", &[])
            .await
            .context("Failed to retrieve bookings")?;

        rows.iter().map(parse_row_into_booking).collect()
    }

    async fn select_user_bookings(
        &self,
        user_id: i32,
    ) -> anyhow::Result<Vec<Booking>> {
        let conn = self.get_postgres_connection().await?;
        let rows = conn
            .query("SELECT * FROM bookings WHERE user_id = $1", &[&user_id])
            .await
            .with_context(|| format!("Failed to retrieve bookings for user: {}", user_id))?;

        rows.iter().map(parse_row_into_booking).collect()
    }

    async fn update_booking_slot(
        &self,
        id: i32,
        update: &BookingUpdate,
    ) -> anyhow::Result<u64> {
        let conn = self.get_postgres_connection().await?;
        let updated = conn
            .execute(
                "UPDATE bookings SET court_no = $1, start_time = $2, end_time = $3 WHERE id = $4",
                &[&update.court_no, &update.start_time, &update.end_time, &id],
            )
            .await?;

        Ok(updated)
    }

    async fn remove_booking(
        &self,
        id: i32,
    ) -> anyhow::Result<u64> {
        let conn = self.get_postgres_connection().await?;
        let deleted = conn
            .execute("DELETE FROM bookings WHERE id = $1", &[&id])
            .await?;

        Ok(deleted)
    }
}

impl<Tls> BookingRepository for PostgresConnectionRepo<Tls>
where
    Tls: MakeTlsConnect<Socket> + Clone + Send + Sync + 'static,
    Tls::Stream: Send + Sync,
    Tls::TlsConnect: Send,
    <Tls::TlsConnect as TlsConnect<Socket>>::Future: Send,
{
    fn create_booking<'a>(&'a self, booking: &'a NewBooking) -> BoxFuture<'a, anyhow::Result<i32>> {
        self.insert_booking(booking).boxed()
    }

    fn list_bookings(&self) -> BoxFuture<'_, anyhow::Result<Vec<Booking>>> {
        self.select_all_bookings().boxed()
    }

    fn list_bookings_by_user(&self, user_id: i32) -> BoxFuture<'_, anyhow::Result<Vec<Booking>>> {
        self.select_user_bookings(user_id).boxed()
    }

    fn update_booking<'a>(
        &'a self,
        id: i32,
        update: &'a BookingUpdate,
    ) -> BoxFuture<'a, anyhow::Result<u64>> {
        self.update_booking_slot(id, update).boxed()
    }

    fn delete_booking(&self, id: i32) -> BoxFuture<'_, anyhow::Result<u64>> {
        self.remove_booking(id).boxed()
    }
}

fn parse_row_into_booking(
    row: &Row,
) -> anyhow::Result<Booking> {
    Ok(Booking {
        id: row.try_get("id")?,
        place_id: row.try_get("place_id")?,
        court_no: row.try_get("court_no")?,
        phone_no: row.try_get("phone_no")?,
        email: row.try_get("email")?,
        user_id: row.try_get("user_id")?,
        start_time: row.try_get("start_time")?,
        end_time: row.try_get("end_time")?,
    })
}
