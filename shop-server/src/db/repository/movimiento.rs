//! MovimientoOperador Repository
//!
//! Append-only audit trail. Writes ride the caller's transaction so the
//! audit entry commits with the mutation it describes.

use super::RepoResult;
use shared::models::{Accion, MovimientoView};
use shared::util::snowflake_id;
use sqlx::{SqlitePool, Transaction};

pub async fn registrar(
    tx: &mut Transaction<'_, sqlx::Sqlite>,
    operador_id: i64,
    accion: Accion,
    detalles: &str,
    pedido_id: Option<i64>,
    fecha: i64,
) -> RepoResult<()> {
    sqlx::query(
        "INSERT INTO movimiento_operador (id, operador_id, accion, detalles, pedido_id, fecha) VALUES (?, ?, ?, ?, ?, ?)",
    )
    .bind(snowflake_id())
    .bind(operador_id)
    .bind(accion)
    .bind(detalles)
    .bind(pedido_id)
    .bind(fecha)
    .execute(&mut **tx)
    .await?;
    Ok(())
}

/// Movement history, newest first, with operator and folio joined in. The
/// pedido join is LEFT so entries survive order deletion.
pub async fn listar(pool: &SqlitePool, limit: i64, offset: i64) -> RepoResult<Vec<MovimientoView>> {
    let movimientos = sqlx::query_as::<_, MovimientoView>(
        "SELECT m.id, m.operador_id, u.username AS operador_username, m.accion, m.detalles, m.pedido_id, p.folio AS pedido_folio, m.fecha \
         FROM movimiento_operador m \
         JOIN usuario u ON u.id = m.operador_id \
         LEFT JOIN pedido p ON p.id = m.pedido_id \
         ORDER BY m.fecha DESC, m.id DESC \
         LIMIT ? OFFSET ?",
    )
    .bind(limit)
    .bind(offset)
    .fetch_all(pool)
    .await?;
    Ok(movimientos)
}
