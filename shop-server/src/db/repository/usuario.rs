//! Usuario Repository
//!
//! Read-only access to the identity mirror. Rows are provisioned by the
//! external identity system; this service never writes them outside tests.

use super::RepoResult;
use shared::models::Usuario;
use sqlx::SqlitePool;

pub async fn find_by_id(pool: &SqlitePool, id: i64) -> RepoResult<Option<Usuario>> {
    let usuario = sqlx::query_as::<_, Usuario>(
        "SELECT id, username, nombre, email, telefono, direccion, rol, activo, created_at, updated_at FROM usuario WHERE id = ?",
    )
    .bind(id)
    .fetch_optional(pool)
    .await?;
    Ok(usuario)
}

/// Resolve an active client by id. Returns None when the id does not exist,
/// is inactive, or belongs to a non-client role.
pub async fn find_cliente_activo(pool: &SqlitePool, id: i64) -> RepoResult<Option<Usuario>> {
    let usuario = sqlx::query_as::<_, Usuario>(
        "SELECT id, username, nombre, email, telefono, direccion, rol, activo, created_at, updated_at FROM usuario WHERE id = ? AND rol = 'cliente' AND activo = 1",
    )
    .bind(id)
    .fetch_optional(pool)
    .await?;
    Ok(usuario)
}

/// Client search for the intake screen: case-insensitive substring match on
/// username, name or phone, capped by `limit`.
pub async fn buscar_clientes(
    pool: &SqlitePool,
    query: &str,
    limit: i32,
) -> RepoResult<Vec<Usuario>> {
    let patron = format!("%{}%", query);
    let usuarios = sqlx::query_as::<_, Usuario>(
        "SELECT id, username, nombre, email, telefono, direccion, rol, activo, created_at, updated_at FROM usuario WHERE rol = 'cliente' AND (username LIKE ?1 OR nombre LIKE ?1 OR telefono LIKE ?1) ORDER BY username LIMIT ?2",
    )
    .bind(patron)
    .bind(limit)
    .fetch_all(pool)
    .await?;
    Ok(usuarios)
}
