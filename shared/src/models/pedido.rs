//! Pedido Models

use serde::{Deserialize, Serialize};

/// Order lifecycle state
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
#[cfg_attr(feature = "db", derive(sqlx::Type))]
#[cfg_attr(feature = "db", sqlx(rename_all = "snake_case"))]
pub enum EstadoPedido {
    #[default]
    Pendiente,
    EnProceso,
    Listo,
    Entregado,
    Cancelado,
}

impl EstadoPedido {
    pub fn as_str(&self) -> &'static str {
        match self {
            EstadoPedido::Pendiente => "pendiente",
            EstadoPedido::EnProceso => "en_proceso",
            EstadoPedido::Listo => "listo",
            EstadoPedido::Entregado => "entregado",
            EstadoPedido::Cancelado => "cancelado",
        }
    }
}

/// Payment state
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
#[cfg_attr(feature = "db", derive(sqlx::Type))]
#[cfg_attr(feature = "db", sqlx(rename_all = "snake_case"))]
pub enum EstadoPago {
    #[default]
    Pendiente,
    Pagado,
}

impl EstadoPago {
    pub fn as_str(&self) -> &'static str {
        match self {
            EstadoPago::Pendiente => "pendiente",
            EstadoPago::Pagado => "pagado",
        }
    }
}

/// Who created the order
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
#[cfg_attr(feature = "db", derive(sqlx::Type))]
#[cfg_attr(feature = "db", sqlx(rename_all = "snake_case"))]
pub enum Origen {
    #[default]
    Cliente,
    Operador,
}

/// Payment method
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
#[cfg_attr(feature = "db", derive(sqlx::Type))]
#[cfg_attr(feature = "db", sqlx(rename_all = "snake_case"))]
pub enum MetodoPago {
    #[default]
    Efectivo,
    Tarjeta,
    Transferencia,
}

/// Who wrote an order note
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
#[cfg_attr(feature = "db", derive(sqlx::Type))]
#[cfg_attr(feature = "db", sqlx(rename_all = "snake_case"))]
pub enum OrigenNota {
    Sistema,
    Operador,
    Cliente,
}

/// Pedido entity
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct Pedido {
    pub id: i64,
    /// `CK-<year>-<4 chars>`, assigned at creation, immutable
    pub folio: String,
    pub cliente_id: i64,
    pub servicio_id: Option<i64>,
    /// Staff member who registered the order (None for client-created)
    pub operador_id: Option<i64>,
    pub tipo_servicio: String,
    /// Weight in kg
    pub peso: f64,
    pub cantidad_prendas: i32,
    /// Creation-time remark; later additions live in `nota_pedido`
    pub observaciones: Option<String>,
    pub cobija_tipo: Option<String>,
    pub lavado_especial: bool,
    pub total: f64,
    pub metodo_pago: MetodoPago,
    pub estado: EstadoPedido,
    pub estado_pago: EstadoPago,
    pub origen: Origen,
    pub fecha_recepcion: i64,
    /// Date-only `YYYY-MM-DD`
    pub fecha_entrega_estimada: Option<String>,
    pub fecha_entrega_real: Option<i64>,
}

/// Order line
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct DetallePedido {
    pub id: i64,
    pub pedido_id: i64,
    pub prenda_id: Option<i64>,
    pub cantidad: i32,
    pub peso: f64,
    pub precio_unitario: f64,
    /// Always `precio_unitario * cantidad`, recomputed on insert
    pub subtotal: f64,
}

/// Append-only order note
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct NotaPedido {
    pub id: i64,
    pub pedido_id: i64,
    pub origen: OrigenNota,
    pub texto: String,
    pub fecha: i64,
}

/// Create order payload (staff counter flow)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PedidoCreate {
    pub cliente_id: i64,
    pub tipo_servicio: Option<String>,
    #[serde(default, with = "crate::models::serde_helpers::flexible_f64")]
    pub peso: f64,
    pub cantidad_prendas: Option<i32>,
    pub observaciones: Option<String>,
    pub cobija_tipo: Option<String>,
    #[serde(default, deserialize_with = "crate::models::serde_helpers::bool_false")]
    pub lavado_especial: bool,
    #[serde(default, with = "crate::models::serde_helpers::flexible_f64")]
    pub total: f64,
    pub metodo_pago: Option<MetodoPago>,
    /// Date-only `YYYY-MM-DD`
    pub fecha_entrega: Option<String>,
}

/// Create order payload (client autoservicio flow, no line items)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AutoservicioCreate {
    pub servicio_id: Option<i64>,
    pub servicio_nombre: Option<String>,
    #[serde(default, with = "crate::models::serde_helpers::flexible_f64")]
    pub total: f64,
    pub metodo_pago: Option<MetodoPago>,
}

/// One garment line in an itemized order
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DetallePedidoInput {
    pub prenda_id: i64,
    pub cantidad: Option<i32>,
    #[serde(default, with = "crate::models::serde_helpers::flexible_f64")]
    pub peso: f64,
    #[serde(default, with = "crate::models::serde_helpers::flexible_f64")]
    pub precio: f64,
    /// Client-computed; the stored subtotal is always recomputed
    #[serde(default, with = "crate::models::serde_helpers::option_flexible_f64")]
    pub subtotal: Option<f64>,
}

/// Create order payload (client itemized flow)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PedidoItemizadoCreate {
    pub prendas: Vec<DetallePedidoInput>,
    #[serde(default, with = "crate::models::serde_helpers::flexible_f64")]
    pub total: f64,
    pub metodo_pago: Option<MetodoPago>,
    pub tipo_servicio: Option<String>,
}

/// Update order payload; absent fields are left untouched
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PedidoUpdate {
    pub estado: Option<EstadoPedido>,
    pub estado_pago: Option<EstadoPago>,
    pub notas: Option<String>,
    /// Together with estado=en_proceso: bind this machine to the order
    pub maquina_id: Option<i64>,
    /// Minutes for the machine cycle
    pub tiempo_asignado: Option<i64>,
}

/// Creation result
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PedidoCreado {
    pub id: i64,
    pub folio: String,
    pub total: f64,
    /// Tracking link; only counter-registered orders produce a ticket
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ticket_url: Option<String>,
}

/// Order row for staff list views (with client info joined in)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct PedidoResumen {
    pub id: i64,
    pub folio: String,
    pub cliente_id: i64,
    pub cliente_username: String,
    pub cliente_nombre: String,
    pub tipo_servicio: String,
    pub total: f64,
    pub estado: EstadoPedido,
    pub estado_pago: EstadoPago,
    pub fecha_recepcion: i64,
    pub fecha_entrega_estimada: Option<String>,
}

/// Full order detail (lines + notes)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PedidoDetalle {
    #[serde(flatten)]
    pub pedido: Pedido,
    pub detalles: Vec<DetallePedido>,
    pub notas: Vec<NotaPedido>,
}
