//! Maquina Repository
//!
//! Washer/dryer fleet: registry CRUD plus the occupancy primitives shared by
//! every assignment path. Acquisition is a single guarded UPDATE so two
//! concurrent assignments of one machine can never both win.

use super::{RepoError, RepoResult};
use shared::models::{Maquina, MaquinaCreate};
use shared::util::{now_millis, snowflake_id};
use sqlx::{SqlitePool, Transaction};

pub async fn find_by_id(pool: &SqlitePool, id: i64) -> RepoResult<Option<Maquina>> {
    let maquina = sqlx::query_as::<_, Maquina>(
        "SELECT id, nombre, tipo, estado, descripcion_falla, pedido_actual, hora_inicio_uso, tiempo_asignado FROM maquina WHERE id = ?",
    )
    .bind(id)
    .fetch_optional(pool)
    .await?;
    Ok(maquina)
}

pub async fn find_all(pool: &SqlitePool) -> RepoResult<Vec<Maquina>> {
    let maquinas = sqlx::query_as::<_, Maquina>(
        "SELECT id, nombre, tipo, estado, descripcion_falla, pedido_actual, hora_inicio_uso, tiempo_asignado FROM maquina ORDER BY tipo, nombre",
    )
    .fetch_all(pool)
    .await?;
    Ok(maquinas)
}

/// Register a new machine. Starts disponible with a clean timer.
pub async fn create(pool: &SqlitePool, data: MaquinaCreate) -> RepoResult<Maquina> {
    let id = snowflake_id();
    sqlx::query(
        "INSERT INTO maquina (id, nombre, tipo, estado, tiempo_asignado) VALUES (?1, ?2, ?3, 'disponible', 0)",
    )
    .bind(id)
    .bind(&data.nombre)
    .bind(data.tipo)
    .execute(pool)
    .await?;

    find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::Database("Failed to create maquina".into()))
}

/// Hard delete (baja definitiva). Returns false when the id does not exist.
pub async fn delete(pool: &SqlitePool, id: i64) -> RepoResult<bool> {
    let result = sqlx::query("DELETE FROM maquina WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}

/// Put a machine in maintenance, from any state. The failure description is
/// optional; reporting without one just flags the machine.
pub async fn reportar_mantenimiento(
    pool: &SqlitePool,
    id: i64,
    descripcion: Option<String>,
) -> RepoResult<Maquina> {
    let result = sqlx::query(
        "UPDATE maquina SET estado = 'mantenimiento', descripcion_falla = ?1 WHERE id = ?2",
    )
    .bind(descripcion)
    .bind(id)
    .execute(pool)
    .await?;
    if result.rows_affected() == 0 {
        return Err(RepoError::NotFound(format!("Maquina {id} not found")));
    }

    find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::Database("Failed to read maquina after update".into()))
}

/// Quick occupancy toggle: disponible -> ocupado -> disponible. Timer fields
/// are left untouched (an occupied machine without a start time reads as 0
/// remaining). Machines in mantenimiento are not toggled.
pub async fn toggle_uso(pool: &SqlitePool, id: i64) -> RepoResult<Maquina> {
    let result = sqlx::query(
        "UPDATE maquina SET estado = CASE estado \
            WHEN 'disponible' THEN 'ocupado' \
            WHEN 'ocupado' THEN 'disponible' \
            ELSE estado END \
         WHERE id = ?",
    )
    .bind(id)
    .execute(pool)
    .await?;
    if result.rows_affected() == 0 {
        return Err(RepoError::NotFound(format!("Maquina {id} not found")));
    }

    find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::Database("Failed to read maquina after toggle".into()))
}

/// Bring a machine back to service: disponible, and every occupancy and
/// failure field cleared so it never returns carrying a stale order.
pub async fn reactivar(pool: &SqlitePool, id: i64) -> RepoResult<Maquina> {
    let result = sqlx::query(
        "UPDATE maquina SET estado = 'disponible', pedido_actual = NULL, hora_inicio_uso = NULL, tiempo_asignado = 0, descripcion_falla = NULL WHERE id = ?",
    )
    .bind(id)
    .execute(pool)
    .await?;
    if result.rows_affected() == 0 {
        return Err(RepoError::NotFound(format!("Maquina {id} not found")));
    }

    find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::Database("Failed to read maquina after reactivar".into()))
}

/// Acquire a machine for an order: compare-and-swap on estado. The UPDATE
/// only fires while the machine is still disponible, so of two concurrent
/// acquisitions exactly one sees rows_affected = 1.
///
/// Returns true when this caller won the machine.
pub async fn ocupar(
    tx: &mut Transaction<'_, sqlx::Sqlite>,
    maquina_id: i64,
    pedido_id: i64,
    tiempo_minutos: i64,
) -> RepoResult<bool> {
    let result = sqlx::query(
        "UPDATE maquina SET estado = 'ocupado', pedido_actual = ?1, hora_inicio_uso = ?2, tiempo_asignado = ?3 WHERE id = ?4 AND estado = 'disponible'",
    )
    .bind(pedido_id)
    .bind(now_millis())
    .bind(tiempo_minutos)
    .bind(maquina_id)
    .execute(&mut **tx)
    .await?;
    Ok(result.rows_affected() == 1)
}

/// Release every machine still bound to the given order (delivery or
/// cancellation). Returns how many machines were freed.
pub async fn liberar_de_pedido(
    tx: &mut Transaction<'_, sqlx::Sqlite>,
    pedido_id: i64,
) -> RepoResult<u64> {
    let result = sqlx::query(
        "UPDATE maquina SET estado = 'disponible', pedido_actual = NULL, hora_inicio_uso = NULL, tiempo_asignado = 0 WHERE pedido_actual = ?",
    )
    .bind(pedido_id)
    .execute(&mut **tx)
    .await?;
    Ok(result.rows_affected())
}

/// Transaction-scoped read, for snapshots inside a mutation.
pub async fn find_by_id_tx(
    tx: &mut Transaction<'_, sqlx::Sqlite>,
    id: i64,
) -> RepoResult<Option<Maquina>> {
    let maquina = sqlx::query_as::<_, Maquina>(
        "SELECT id, nombre, tipo, estado, descripcion_falla, pedido_actual, hora_inicio_uso, tiempo_asignado FROM maquina WHERE id = ?",
    )
    .bind(id)
    .fetch_optional(&mut **tx)
    .await?;
    Ok(maquina)
}
