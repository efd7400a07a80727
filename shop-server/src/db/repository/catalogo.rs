//! Catalogo Repository
//!
//! Garment and service price catalog. Read paths only; prices are managed
//! by the back office, this service just consumes them.

use super::RepoResult;
use shared::models::{Prenda, Servicio, TipoServicio};
use sqlx::SqlitePool;

pub async fn find_prenda(pool: &SqlitePool, id: i64) -> RepoResult<Option<Prenda>> {
    let prenda = sqlx::query_as::<_, Prenda>(
        "SELECT id, nombre, precio, activo, fecha_actualizacion FROM prenda WHERE id = ?",
    )
    .bind(id)
    .fetch_optional(pool)
    .await?;
    Ok(prenda)
}

pub async fn prendas_activas(pool: &SqlitePool) -> RepoResult<Vec<Prenda>> {
    let prendas = sqlx::query_as::<_, Prenda>(
        "SELECT id, nombre, precio, activo, fecha_actualizacion FROM prenda WHERE activo = 1 ORDER BY nombre",
    )
    .fetch_all(pool)
    .await?;
    Ok(prendas)
}

pub async fn find_servicio(pool: &SqlitePool, id: i64) -> RepoResult<Option<Servicio>> {
    let servicio = sqlx::query_as::<_, Servicio>(
        "SELECT id, nombre, tipo, precio, descripcion, activo, fecha_actualizacion FROM servicio WHERE id = ?",
    )
    .bind(id)
    .fetch_optional(pool)
    .await?;
    Ok(servicio)
}

/// First active service of the given tipo, used to link itemized client
/// orders to their service entry.
pub async fn find_servicio_por_tipo(
    pool: &SqlitePool,
    tipo: TipoServicio,
) -> RepoResult<Option<Servicio>> {
    let servicio = sqlx::query_as::<_, Servicio>(
        "SELECT id, nombre, tipo, precio, descripcion, activo, fecha_actualizacion FROM servicio WHERE activo = 1 AND tipo = ? ORDER BY id LIMIT 1",
    )
    .bind(tipo)
    .fetch_optional(pool)
    .await?;
    Ok(servicio)
}

pub async fn servicios_activos(pool: &SqlitePool) -> RepoResult<Vec<Servicio>> {
    let servicios = sqlx::query_as::<_, Servicio>(
        "SELECT id, nombre, tipo, precio, descripcion, activo, fecha_actualizacion FROM servicio WHERE activo = 1 ORDER BY id",
    )
    .fetch_all(pool)
    .await?;
    Ok(servicios)
}
