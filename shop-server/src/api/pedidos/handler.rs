//! Pedido API Handlers

use axum::{
    Json,
    extract::{Extension, Path, Query, State},
};
use serde::Deserialize;

use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::db::repository::pedido;
use crate::orders;
use crate::utils::{ApiResponse, AppError, AppResult, ErrorCode};
use shared::models::{
    AsignacionMaquina, AutoservicioCreate, MaquinaView, Pedido, PedidoCreado, PedidoCreate,
    PedidoDetalle, PedidoItemizadoCreate, PedidoResumen, PedidoUpdate,
};

/// Query params for the staff processing board
#[derive(Debug, Deserialize)]
pub struct ListaQuery {
    /// Folio or client substring filter
    pub buscar: Option<String>,
}

/// GET /api/pedidos - 处理中的订单 (pendiente/en_proceso/listo)
pub async fn listar(
    State(state): State<ServerState>,
    Query(query): Query<ListaQuery>,
) -> AppResult<Json<Vec<PedidoResumen>>> {
    let pedidos = pedido::activos(state.pool(), query.buscar.as_deref()).await?;
    Ok(Json(pedidos))
}

/// GET /api/pedidos/{id} - 订单详情 (含明细和备注)
pub async fn detalle(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> AppResult<Json<PedidoDetalle>> {
    let pool = state.pool();
    let p = pedido::find_by_id(pool, id)
        .await?
        .ok_or_else(|| AppError::new(ErrorCode::PedidoNotFound))?;
    let detalles = pedido::detalles(pool, p.id).await?;
    let notas = pedido::notas(pool, p.id).await?;
    Ok(Json(PedidoDetalle {
        pedido: p,
        detalles,
        notas,
    }))
}

/// GET /api/pedidos/folio/{folio} - 票据跟踪 (公开, QR 目标)
pub async fn por_folio(
    State(state): State<ServerState>,
    Path(folio): Path<String>,
) -> AppResult<Json<PedidoDetalle>> {
    let pool = state.pool();
    let p = pedido::find_by_folio(pool, folio.trim())
        .await?
        .ok_or_else(|| AppError::new(ErrorCode::PedidoNotFound))?;
    let detalles = pedido::detalles(pool, p.id).await?;
    let notas = pedido::notas(pool, p.id).await?;
    Ok(Json(PedidoDetalle {
        pedido: p,
        detalles,
        notas,
    }))
}

/// GET /api/pedidos/mios - 当前客户的订单 (除 cancelado 外全部)
pub async fn mis_pedidos(
    State(state): State<ServerState>,
    Extension(current_user): Extension<CurrentUser>,
) -> AppResult<Json<Vec<Pedido>>> {
    let pedidos = pedido::del_cliente(state.pool(), current_user.id).await?;
    Ok(Json(pedidos))
}

/// POST /api/pedidos - 柜台登记订单
pub async fn crear(
    State(state): State<ServerState>,
    Extension(current_user): Extension<CurrentUser>,
    Json(payload): Json<PedidoCreate>,
) -> AppResult<ApiResponse<PedidoCreado>> {
    let (creado, mensaje) = orders::crear_pedido_operador(&state, &current_user, payload).await?;
    Ok(ApiResponse::success_with_message(mensaje, creado))
}

/// POST /api/pedidos/autoservicio - 客户自助下单
pub async fn crear_autoservicio(
    State(state): State<ServerState>,
    Extension(current_user): Extension<CurrentUser>,
    Json(payload): Json<AutoservicioCreate>,
) -> AppResult<ApiResponse<PedidoCreado>> {
    let (creado, mensaje) = orders::crear_autoservicio(&state, &current_user, payload).await?;
    Ok(ApiResponse::success_with_message(mensaje, creado))
}

/// POST /api/pedidos/itemizado - 客户按件下单
pub async fn crear_itemizado(
    State(state): State<ServerState>,
    Extension(current_user): Extension<CurrentUser>,
    Json(payload): Json<PedidoItemizadoCreate>,
) -> AppResult<ApiResponse<PedidoCreado>> {
    let (creado, mensaje) = orders::crear_itemizado(&state, &current_user, payload).await?;
    Ok(ApiResponse::success_with_message(mensaje, creado))
}

/// PUT /api/pedidos/{id} - 更新状态/付款/备注, 可联动机器
pub async fn actualizar(
    State(state): State<ServerState>,
    Extension(current_user): Extension<CurrentUser>,
    Path(id): Path<i64>,
    Json(payload): Json<PedidoUpdate>,
) -> AppResult<ApiResponse<Pedido>> {
    let (actualizado, mensaje) =
        orders::actualizar_pedido(&state, &current_user, id, payload).await?;
    Ok(ApiResponse::success_with_message(mensaje, actualizado))
}

/// POST /api/pedidos/asignar-maquina - 直接分配机器
pub async fn asignar_maquina(
    State(state): State<ServerState>,
    Extension(current_user): Extension<CurrentUser>,
    Json(payload): Json<AsignacionMaquina>,
) -> AppResult<ApiResponse<MaquinaView>> {
    let (maquina, mensaje) = orders::asignar_maquina(&state, &current_user, payload).await?;
    Ok(ApiResponse::success_with_message(mensaje, maquina))
}

/// POST /api/pedidos/{id}/entregar - 凭折交付
pub async fn entregar(
    State(state): State<ServerState>,
    Extension(current_user): Extension<CurrentUser>,
    Path(id): Path<i64>,
) -> AppResult<ApiResponse<Pedido>> {
    let (entregado, mensaje) = orders::entregar_pedido(&state, &current_user, id).await?;
    Ok(ApiResponse::success_with_message(mensaje, entregado))
}
