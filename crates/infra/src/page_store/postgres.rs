//! Postgres-backed page store implementation.
//!
//! Schema: `crates/infra/migrations/0001_pages.sql`.
//!
//! ## Concurrency
//!
//! `commit_parts` runs in one transaction that locks the page row
//! (`SELECT ... FOR UPDATE`), checks the page `version` against the caller's
//! expectation, applies every write, bumps the version and commits. A second
//! editor committing against the same page blocks on the row lock and then
//! fails the version check.
//!
//! ## Error Mapping
//!
//! | SQLSTATE | StoreError | Scenario |
//! |----------|------------|----------|
//! | `23505` unique violation | `Duplicate` | slug taken, two parts on one position |
//! | `23503` foreign key violation | `NotFound` | page/network missing |
//! | `23514` check violation | `InvalidWrite` | negative position |
//! | anything else | `Backend` | connection loss, pool closed, ... |

use std::collections::BTreeMap;
use std::sync::Arc;

use sqlx::postgres::PgRow;
use sqlx::{PgPool, Postgres, Row, Transaction};
use tracing::instrument;
use uuid::Uuid;

use pagecraft_core::{ExpectedVersion, NetworkId, PageId, PartId, TemplateId};
use pagecraft_pages::{LocalizedText, Network, Page, Part, PartKind, PartWrite, PartsSnapshot, Variable};

use super::r#trait::{PageStore, StoreError};

/// Postgres-backed page store.
///
/// Uses the SQLx connection pool, which is `Send + Sync` and cheap to clone.
#[derive(Debug, Clone)]
pub struct PostgresPageStore {
    pool: Arc<PgPool>,
}

impl PostgresPageStore {
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool: Arc::new(pool),
        }
    }

    /// Connect to `database_url` and wrap the pool.
    pub async fn connect(database_url: &str) -> Result<Self, StoreError> {
        let pool = PgPool::connect(database_url)
            .await
            .map_err(|e| map_sqlx_error("connect", e))?;
        Ok(Self::new(pool))
    }

    /// Apply the bundled schema (idempotent).
    pub async fn migrate(&self) -> Result<(), StoreError> {
        sqlx::raw_sql(include_str!("../../migrations/0001_pages.sql"))
            .execute(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("migrate", e))?;
        Ok(())
    }
}

#[async_trait::async_trait]
impl PageStore for PostgresPageStore {
    #[instrument(skip(self, network), fields(slug = %network.slug()), err)]
    async fn create_network(&self, network: Network) -> Result<Network, StoreError> {
        sqlx::query("INSERT INTO networks (network_id, slug, name) VALUES ($1, $2, $3)")
            .bind(network.network_id().as_uuid())
            .bind(network.slug())
            .bind(network.name())
            .execute(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("create_network", e))?;
        Ok(network)
    }

    #[instrument(skip(self), err)]
    async fn find_network(&self, slug: &str) -> Result<Network, StoreError> {
        let row = sqlx::query("SELECT network_id, slug, name FROM networks WHERE slug = $1")
            .bind(slug)
            .fetch_optional(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("find_network", e))?
            .ok_or_else(|| StoreError::NotFound(format!("network '{slug}' not found")))?;

        Network::from_record(
            NetworkId::from_uuid(get(&row, "network_id")?),
            get::<String>(&row, "slug")?,
            get::<String>(&row, "name")?,
        )
        .map_err(|e| StoreError::Backend(format!("corrupt network row: {e}")))
    }

    #[instrument(skip(self, page), fields(page_id = %page.page_id(), slug = %page.slug()), err)]
    async fn create_page(&self, page: Page) -> Result<Page, StoreError> {
        sqlx::query(
            r#"
            INSERT INTO pages (page_id, network_id, template_id, slug, title, version)
            VALUES ($1, $2, $3, $4, $5, 0)
            "#,
        )
        .bind(page.page_id().as_uuid())
        .bind(page.network_id().as_uuid())
        .bind(page.template_id().as_uuid())
        .bind(page.slug())
        .bind(page.title())
        .execute(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("create_page", e))?;
        Ok(page.with_version(0))
    }

    #[instrument(skip(self), fields(page_id = %page_id), err)]
    async fn get_page(&self, page_id: PageId) -> Result<Page, StoreError> {
        let row = sqlx::query(
            r#"
            SELECT page_id, network_id, template_id, slug, title, version
            FROM pages
            WHERE page_id = $1
            "#,
        )
        .bind(page_id.as_uuid())
        .fetch_optional(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("get_page", e))?
        .ok_or_else(|| StoreError::NotFound(format!("page {page_id} not found")))?;

        page_from_row(&row)
    }

    #[instrument(skip(self), err)]
    async fn find_page(&self, network_slug: &str, page_slug: &str) -> Result<Page, StoreError> {
        let network = self.find_network(network_slug).await?;
        let row = sqlx::query(
            r#"
            SELECT page_id, network_id, template_id, slug, title, version
            FROM pages
            WHERE network_id = $1 AND slug = $2
            "#,
        )
        .bind(network.network_id().as_uuid())
        .bind(page_slug)
        .fetch_optional(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("find_page", e))?
        .ok_or_else(|| {
            StoreError::NotFound(format!(
                "page '{page_slug}' not found in network '{network_slug}'"
            ))
        })?;

        page_from_row(&row)
    }

    #[instrument(skip(self), fields(page_id = %page_id), err)]
    async fn get_parts(&self, page_id: PageId) -> Result<PartsSnapshot, StoreError> {
        // One transaction so version and rows come from the same snapshot.
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| map_sqlx_error("begin_transaction", e))?;

        sqlx::query("SET TRANSACTION ISOLATION LEVEL REPEATABLE READ")
            .execute(&mut *tx)
            .await
            .map_err(|e| map_sqlx_error("set_isolation", e))?;

        let version = page_version(&mut tx, page_id, false).await?;
        let rows = sqlx::query(
            r#"
            SELECT part_id, page_id, kind, position
            FROM parts
            WHERE page_id = $1
            ORDER BY position ASC
            "#,
        )
        .bind(page_id.as_uuid())
        .fetch_all(&mut *tx)
        .await
        .map_err(|e| map_sqlx_error("get_parts", e))?;

        tx.commit()
            .await
            .map_err(|e| map_sqlx_error("commit_transaction", e))?;

        let parts = rows.iter().map(part_from_row).collect::<Result<Vec<_>, _>>()?;
        Ok(PartsSnapshot::new(page_id, version, parts))
    }

    #[instrument(skip(self), fields(part_id = %part_id), err)]
    async fn get_part(&self, part_id: PartId) -> Result<Part, StoreError> {
        let row = sqlx::query("SELECT part_id, page_id, kind, position FROM parts WHERE part_id = $1")
            .bind(part_id.as_uuid())
            .fetch_optional(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("get_part", e))?
            .ok_or_else(|| StoreError::NotFound(format!("part {part_id} not found")))?;

        part_from_row(&row)
    }

    #[instrument(
        skip(self, writes),
        fields(page_id = %page_id, expected_version = ?expected_version, write_count = writes.len()),
        err
    )]
    async fn commit_parts(
        &self,
        page_id: PageId,
        expected_version: ExpectedVersion,
        writes: Vec<PartWrite>,
    ) -> Result<u64, StoreError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| map_sqlx_error("begin_transaction", e))?;

        let current = page_version(&mut tx, page_id, true).await?;
        if let Err(stale) = expected_version.check(current) {
            tx.rollback()
                .await
                .map_err(|e| map_sqlx_error("rollback", e))?;
            return Err(StoreError::Concurrency(format!("page {page_id}: {stale}")));
        }

        for write in &writes {
            // Any error drops `tx`, which rolls the whole batch back.
            match write {
                PartWrite::Put(part) => put_part_row(&mut tx, page_id, part).await?,
                PartWrite::Delete(part_id) => {
                    let result = sqlx::query("DELETE FROM parts WHERE part_id = $1 AND page_id = $2")
                        .bind(part_id.as_uuid())
                        .bind(page_id.as_uuid())
                        .execute(&mut *tx)
                        .await
                        .map_err(|e| map_sqlx_error("delete_part", e))?;
                    if result.rows_affected() == 0 {
                        return Err(StoreError::NotFound(format!(
                            "part {part_id} not found on page {page_id}"
                        )));
                    }
                }
            }
        }

        let row = sqlx::query("UPDATE pages SET version = version + 1 WHERE page_id = $1 RETURNING version")
            .bind(page_id.as_uuid())
            .fetch_one(&mut *tx)
            .await
            .map_err(|e| map_sqlx_error("bump_version", e))?;
        let next = to_version(get::<i64>(&row, "version")?)?;

        // Deferred position uniqueness is checked here.
        tx.commit()
            .await
            .map_err(|e| map_sqlx_error("commit_transaction", e))?;

        Ok(next)
    }

    #[instrument(skip(self), fields(page_id = %page_id), err)]
    async fn get_variables(&self, page_id: PageId) -> Result<BTreeMap<String, Variable>, StoreError> {
        let rows = sqlx::query(
            r#"
            SELECT page_id, key, english, french, spanish, portuguese
            FROM variables
            WHERE page_id = $1
            "#,
        )
        .bind(page_id.as_uuid())
        .fetch_all(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("get_variables", e))?;

        rows.iter()
            .map(|row| variable_from_row(row).map(|v| (v.key().to_string(), v)))
            .collect()
    }

    #[instrument(skip(self), fields(page_id = %page_id), err)]
    async fn get_variable(&self, page_id: PageId, key: &str) -> Result<Option<Variable>, StoreError> {
        let row = sqlx::query(
            r#"
            SELECT page_id, key, english, french, spanish, portuguese
            FROM variables
            WHERE page_id = $1 AND key = $2
            "#,
        )
        .bind(page_id.as_uuid())
        .bind(key)
        .fetch_optional(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("get_variable", e))?;

        row.as_ref().map(variable_from_row).transpose()
    }

    #[instrument(skip(self, variable), fields(page_id = %variable.page_id(), key = %variable.key()), err)]
    async fn put_variable(&self, variable: Variable) -> Result<(), StoreError> {
        let texts = variable.texts();
        sqlx::query(
            r#"
            INSERT INTO variables (page_id, key, english, french, spanish, portuguese)
            VALUES ($1, $2, $3, $4, $5, $6)
            ON CONFLICT (page_id, key)
            DO UPDATE SET
                english = EXCLUDED.english,
                french = EXCLUDED.french,
                spanish = EXCLUDED.spanish,
                portuguese = EXCLUDED.portuguese
            "#,
        )
        .bind(variable.page_id().as_uuid())
        .bind(variable.key())
        .bind(&texts.english)
        .bind(&texts.french)
        .bind(&texts.spanish)
        .bind(&texts.portuguese)
        .execute(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("put_variable", e))?;
        Ok(())
    }
}

async fn page_version(
    tx: &mut Transaction<'_, Postgres>,
    page_id: PageId,
    lock: bool,
) -> Result<u64, StoreError> {
    let sql = if lock {
        "SELECT version FROM pages WHERE page_id = $1 FOR UPDATE"
    } else {
        "SELECT version FROM pages WHERE page_id = $1"
    };
    let row = sqlx::query(sql)
        .bind(page_id.as_uuid())
        .fetch_optional(&mut **tx)
        .await
        .map_err(|e| map_sqlx_error("page_version", e))?
        .ok_or_else(|| StoreError::NotFound(format!("page {page_id} not found")))?;
    to_version(get::<i64>(&row, "version")?)
}

async fn put_part_row(
    tx: &mut Transaction<'_, Postgres>,
    page_id: PageId,
    part: &Part,
) -> Result<(), StoreError> {
    if part.page_id() != page_id {
        return Err(StoreError::InvalidWrite(format!(
            "part {} belongs to page {}, not {page_id}",
            part.part_id(),
            part.page_id()
        )));
    }
    let position = i32::try_from(part.position())
        .map_err(|_| StoreError::InvalidWrite(format!("position {} out of range", part.position())))?;

    // The WHERE clause refuses to move an existing part across pages.
    let result = sqlx::query(
        r#"
        INSERT INTO parts (part_id, page_id, kind, position)
        VALUES ($1, $2, $3, $4)
        ON CONFLICT (part_id)
        DO UPDATE SET
            kind = EXCLUDED.kind,
            position = EXCLUDED.position
        WHERE parts.page_id = EXCLUDED.page_id
        "#,
    )
    .bind(part.part_id().as_uuid())
    .bind(page_id.as_uuid())
    .bind(part.kind().wire())
    .bind(position)
    .execute(&mut **tx)
    .await
    .map_err(|e| map_sqlx_error("put_part", e))?;

    if result.rows_affected() == 0 {
        return Err(StoreError::InvalidWrite(format!(
            "part {} already belongs to another page",
            part.part_id()
        )));
    }
    Ok(())
}

fn get<'r, T>(row: &'r PgRow, column: &str) -> Result<T, StoreError>
where
    T: sqlx::Decode<'r, Postgres> + sqlx::Type<Postgres>,
{
    row.try_get::<T, _>(column)
        .map_err(|e| StoreError::Backend(format!("failed to read column {column}: {e}")))
}

fn to_version(raw: i64) -> Result<u64, StoreError> {
    u64::try_from(raw).map_err(|_| StoreError::Backend(format!("negative page version {raw}")))
}

fn page_from_row(row: &PgRow) -> Result<Page, StoreError> {
    Page::from_record(
        PageId::from_uuid(get::<Uuid>(row, "page_id")?),
        NetworkId::from_uuid(get::<Uuid>(row, "network_id")?),
        TemplateId::from_uuid(get::<Uuid>(row, "template_id")?),
        get::<String>(row, "slug")?,
        get::<String>(row, "title")?,
        to_version(get::<i64>(row, "version")?)?,
    )
    .map_err(|e| StoreError::Backend(format!("corrupt page row: {e}")))
}

fn part_from_row(row: &PgRow) -> Result<Part, StoreError> {
    let kind: PartKind = get::<String>(row, "kind")?
        .parse()
        .map_err(|e| StoreError::Backend(format!("corrupt part row: {e}")))?;
    let position = u32::try_from(get::<i32>(row, "position")?)
        .map_err(|_| StoreError::Backend("corrupt part row: negative position".to_string()))?;
    Ok(Part::from_record(
        PartId::from_uuid(get::<Uuid>(row, "part_id")?),
        PageId::from_uuid(get::<Uuid>(row, "page_id")?),
        kind,
        position,
    ))
}

fn variable_from_row(row: &PgRow) -> Result<Variable, StoreError> {
    let texts = LocalizedText::new(
        get::<String>(row, "english")?,
        get::<String>(row, "french")?,
        get::<String>(row, "spanish")?,
        get::<String>(row, "portuguese")?,
    );
    Variable::new(
        PageId::from_uuid(get::<Uuid>(row, "page_id")?),
        get::<String>(row, "key")?,
        texts,
    )
    .map_err(|e| StoreError::Backend(format!("corrupt variable row: {e}")))
}

/// Map SQLx errors to `StoreError`.
fn map_sqlx_error(operation: &str, err: sqlx::Error) -> StoreError {
    match err {
        sqlx::Error::Database(db_err) => {
            let msg = format!("database error in {}: {}", operation, db_err.message());
            match db_err.code().as_deref() {
                Some("23505") => StoreError::Duplicate(msg),
                Some("23503") => StoreError::NotFound(msg),
                Some("23514") => StoreError::InvalidWrite(msg),
                _ => {
                    tracing::error!(operation, error = %msg, "page store database error");
                    StoreError::Backend(msg)
                }
            }
        }
        other => {
            tracing::error!(operation, error = %other, "page store backend error");
            StoreError::Backend(format!("{operation}: {other}"))
        }
    }
}
