//! Pedido Repository
//!
//! 订单持久层: inserts run inside the caller's transaction so an order, its
//! lines, its notes and the audit entry land atomically. State transitions
//! are guarded UPDATEs; a statement that matches no row reports failure
//! without poisoning the transaction.

use super::{RepoError, RepoResult};
use shared::models::{
    DetallePedido, EstadoPago, EstadoPedido, MetodoPago, NotaPedido, Origen, OrigenNota, Pedido,
    PedidoResumen,
};
use shared::util::snowflake_id;
use sqlx::{SqlitePool, Transaction};

/// Insert shape for a new order. estado/estado_pago start at their
/// column defaults (pendiente).
#[derive(Debug, Clone)]
pub struct PedidoNuevo {
    pub folio: String,
    pub cliente_id: i64,
    pub servicio_id: Option<i64>,
    pub operador_id: Option<i64>,
    pub tipo_servicio: String,
    pub peso: f64,
    pub cantidad_prendas: i32,
    pub observaciones: Option<String>,
    pub cobija_tipo: Option<String>,
    pub lavado_especial: bool,
    pub total: f64,
    pub metodo_pago: MetodoPago,
    pub origen: Origen,
    pub fecha_recepcion: i64,
    pub fecha_entrega_estimada: Option<String>,
}

/// Insert shape for one order line. `subtotal` is the caller's recomputed
/// value, never the client's.
#[derive(Debug, Clone)]
pub struct DetalleNuevo {
    pub prenda_id: Option<i64>,
    pub cantidad: i32,
    pub peso: f64,
    pub precio_unitario: f64,
    pub subtotal: f64,
}

/// Insert a new order. A folio collision surfaces as `RepoError::Duplicate`
/// and leaves the transaction usable, so the caller can retry with a fresh
/// folio without starting over.
pub async fn insertar(
    tx: &mut Transaction<'_, sqlx::Sqlite>,
    pedido: &PedidoNuevo,
) -> RepoResult<i64> {
    let id = snowflake_id();
    sqlx::query(
        "INSERT INTO pedido (id, folio, cliente_id, servicio_id, operador_id, tipo_servicio, peso, cantidad_prendas, observaciones, cobija_tipo, lavado_especial, total, metodo_pago, origen, fecha_recepcion, fecha_entrega_estimada) \
         VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(id)
    .bind(&pedido.folio)
    .bind(pedido.cliente_id)
    .bind(pedido.servicio_id)
    .bind(pedido.operador_id)
    .bind(&pedido.tipo_servicio)
    .bind(pedido.peso)
    .bind(pedido.cantidad_prendas)
    .bind(&pedido.observaciones)
    .bind(&pedido.cobija_tipo)
    .bind(pedido.lavado_especial)
    .bind(pedido.total)
    .bind(pedido.metodo_pago)
    .bind(pedido.origen)
    .bind(pedido.fecha_recepcion)
    .bind(&pedido.fecha_entrega_estimada)
    .execute(&mut **tx)
    .await?;
    Ok(id)
}

pub async fn insertar_detalle(
    tx: &mut Transaction<'_, sqlx::Sqlite>,
    pedido_id: i64,
    detalle: &DetalleNuevo,
) -> RepoResult<i64> {
    let id = snowflake_id();
    sqlx::query(
        "INSERT INTO detalle_pedido (id, pedido_id, prenda_id, cantidad, peso, precio_unitario, subtotal) VALUES (?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(id)
    .bind(pedido_id)
    .bind(detalle.prenda_id)
    .bind(detalle.cantidad)
    .bind(detalle.peso)
    .bind(detalle.precio_unitario)
    .bind(detalle.subtotal)
    .execute(&mut **tx)
    .await?;
    Ok(id)
}

pub async fn insertar_nota(
    tx: &mut Transaction<'_, sqlx::Sqlite>,
    pedido_id: i64,
    origen: OrigenNota,
    texto: &str,
    fecha: i64,
) -> RepoResult<()> {
    sqlx::query(
        "INSERT INTO nota_pedido (id, pedido_id, origen, texto, fecha) VALUES (?, ?, ?, ?, ?)",
    )
    .bind(snowflake_id())
    .bind(pedido_id)
    .bind(origen)
    .bind(texto)
    .bind(fecha)
    .execute(&mut **tx)
    .await?;
    Ok(())
}

/// Partial state update: None leaves the column as-is.
pub async fn actualizar_estados(
    tx: &mut Transaction<'_, sqlx::Sqlite>,
    id: i64,
    estado: Option<EstadoPedido>,
    estado_pago: Option<EstadoPago>,
) -> RepoResult<()> {
    let result = sqlx::query(
        "UPDATE pedido SET estado = COALESCE(?1, estado), estado_pago = COALESCE(?2, estado_pago) WHERE id = ?3",
    )
    .bind(estado)
    .bind(estado_pago)
    .bind(id)
    .execute(&mut **tx)
    .await?;
    if result.rows_affected() == 0 {
        return Err(RepoError::NotFound(format!("Pedido {id} not found")));
    }
    Ok(())
}

/// Counter delivery: only fires while the order is listo. The real delivery
/// timestamp is written once and never overwritten.
///
/// Returns false when the order was not in listo (caller decides why).
pub async fn marcar_entregado(
    tx: &mut Transaction<'_, sqlx::Sqlite>,
    id: i64,
    ahora: i64,
) -> RepoResult<bool> {
    let result = sqlx::query(
        "UPDATE pedido SET estado = 'entregado', fecha_entrega_real = COALESCE(fecha_entrega_real, ?1) WHERE id = ?2 AND estado = 'listo'",
    )
    .bind(ahora)
    .bind(id)
    .execute(&mut **tx)
    .await?;
    Ok(result.rows_affected() == 1)
}

/// Stamp the real delivery timestamp if not already stamped (staff update
/// path when the new state is entregado).
pub async fn fijar_fecha_entrega_real(
    tx: &mut Transaction<'_, sqlx::Sqlite>,
    id: i64,
    ahora: i64,
) -> RepoResult<()> {
    sqlx::query(
        "UPDATE pedido SET fecha_entrega_real = COALESCE(fecha_entrega_real, ?1) WHERE id = ?2",
    )
    .bind(ahora)
    .bind(id)
    .execute(&mut **tx)
    .await?;
    Ok(())
}

/// Cash on delivery: pending payment becomes pagado/efectivo. Already-paid
/// orders are left untouched.
///
/// Returns true when the payment was settled by this call.
pub async fn pagar_al_entregar(
    tx: &mut Transaction<'_, sqlx::Sqlite>,
    id: i64,
) -> RepoResult<bool> {
    let result = sqlx::query(
        "UPDATE pedido SET estado_pago = 'pagado', metodo_pago = 'efectivo' WHERE id = ? AND estado_pago = 'pendiente'",
    )
    .bind(id)
    .execute(&mut **tx)
    .await?;
    Ok(result.rows_affected() == 1)
}

pub async fn find_by_id(pool: &SqlitePool, id: i64) -> RepoResult<Option<Pedido>> {
    let pedido = sqlx::query_as::<_, Pedido>(
        "SELECT id, folio, cliente_id, servicio_id, operador_id, tipo_servicio, peso, cantidad_prendas, observaciones, cobija_tipo, lavado_especial, total, metodo_pago, estado, estado_pago, origen, fecha_recepcion, fecha_entrega_estimada, fecha_entrega_real FROM pedido WHERE id = ?",
    )
    .bind(id)
    .fetch_optional(pool)
    .await?;
    Ok(pedido)
}

pub async fn find_by_id_tx(
    tx: &mut Transaction<'_, sqlx::Sqlite>,
    id: i64,
) -> RepoResult<Option<Pedido>> {
    let pedido = sqlx::query_as::<_, Pedido>(
        "SELECT id, folio, cliente_id, servicio_id, operador_id, tipo_servicio, peso, cantidad_prendas, observaciones, cobija_tipo, lavado_especial, total, metodo_pago, estado, estado_pago, origen, fecha_recepcion, fecha_entrega_estimada, fecha_entrega_real FROM pedido WHERE id = ?",
    )
    .bind(id)
    .fetch_optional(&mut **tx)
    .await?;
    Ok(pedido)
}

pub async fn find_by_folio(pool: &SqlitePool, folio: &str) -> RepoResult<Option<Pedido>> {
    let pedido = sqlx::query_as::<_, Pedido>(
        "SELECT id, folio, cliente_id, servicio_id, operador_id, tipo_servicio, peso, cantidad_prendas, observaciones, cobija_tipo, lavado_especial, total, metodo_pago, estado, estado_pago, origen, fecha_recepcion, fecha_entrega_estimada, fecha_entrega_real FROM pedido WHERE folio = ?",
    )
    .bind(folio)
    .fetch_optional(pool)
    .await?;
    Ok(pedido)
}

/// Active orders for the staff board (pendiente/en_proceso/listo), newest
/// first, with the client joined in. `buscar` matches folio, username or
/// client name.
pub async fn activos(pool: &SqlitePool, buscar: Option<&str>) -> RepoResult<Vec<PedidoResumen>> {
    let pedidos = match buscar.map(str::trim).filter(|b| !b.is_empty()) {
        Some(b) => {
            let patron = format!("%{b}%");
            sqlx::query_as::<_, PedidoResumen>(
                "SELECT p.id, p.folio, p.cliente_id, u.username AS cliente_username, u.nombre AS cliente_nombre, p.tipo_servicio, p.total, p.estado, p.estado_pago, p.fecha_recepcion, p.fecha_entrega_estimada \
                 FROM pedido p JOIN usuario u ON u.id = p.cliente_id \
                 WHERE p.estado IN ('pendiente', 'en_proceso', 'listo') \
                   AND (p.folio LIKE ?1 OR u.username LIKE ?1 OR u.nombre LIKE ?1) \
                 ORDER BY p.fecha_recepcion DESC",
            )
            .bind(patron)
            .fetch_all(pool)
            .await?
        }
        None => {
            sqlx::query_as::<_, PedidoResumen>(
                "SELECT p.id, p.folio, p.cliente_id, u.username AS cliente_username, u.nombre AS cliente_nombre, p.tipo_servicio, p.total, p.estado, p.estado_pago, p.fecha_recepcion, p.fecha_entrega_estimada \
                 FROM pedido p JOIN usuario u ON u.id = p.cliente_id \
                 WHERE p.estado IN ('pendiente', 'en_proceso', 'listo') \
                 ORDER BY p.fecha_recepcion DESC",
            )
            .fetch_all(pool)
            .await?
        }
    };
    Ok(pedidos)
}

/// Client dashboard: everything except cancelled, newest first.
pub async fn del_cliente(pool: &SqlitePool, cliente_id: i64) -> RepoResult<Vec<Pedido>> {
    let pedidos = sqlx::query_as::<_, Pedido>(
        "SELECT id, folio, cliente_id, servicio_id, operador_id, tipo_servicio, peso, cantidad_prendas, observaciones, cobija_tipo, lavado_especial, total, metodo_pago, estado, estado_pago, origen, fecha_recepcion, fecha_entrega_estimada, fecha_entrega_real FROM pedido WHERE cliente_id = ? AND estado != 'cancelado' ORDER BY fecha_recepcion DESC",
    )
    .bind(cliente_id)
    .fetch_all(pool)
    .await?;
    Ok(pedidos)
}

pub async fn detalles(pool: &SqlitePool, pedido_id: i64) -> RepoResult<Vec<DetallePedido>> {
    let detalles = sqlx::query_as::<_, DetallePedido>(
        "SELECT id, pedido_id, prenda_id, cantidad, peso, precio_unitario, subtotal FROM detalle_pedido WHERE pedido_id = ? ORDER BY id",
    )
    .bind(pedido_id)
    .fetch_all(pool)
    .await?;
    Ok(detalles)
}

pub async fn notas(pool: &SqlitePool, pedido_id: i64) -> RepoResult<Vec<NotaPedido>> {
    let notas = sqlx::query_as::<_, NotaPedido>(
        "SELECT id, pedido_id, origen, texto, fecha FROM nota_pedido WHERE pedido_id = ? ORDER BY fecha, id",
    )
    .bind(pedido_id)
    .fetch_all(pool)
    .await?;
    Ok(notas)
}
