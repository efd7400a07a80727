//! Pedido API 模块 (订单)

mod handler;

use axum::{
    Router, middleware,
    routing::{get, post},
};

use crate::auth::{require_cliente, require_staff};
use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/pedidos", routes())
}

fn routes() -> Router<ServerState> {
    // 跟踪路由：票据 QR 目标, 无需令牌 (见 require_auth 的放行列表)
    let public_routes = Router::new().route("/folio/{folio}", get(handler::por_folio));

    // 员工路由：柜台登记、处理看板、更新、机器分配、交付
    let staff_routes = Router::new()
        .route("/", get(handler::listar).post(handler::crear))
        .route("/asignar-maquina", post(handler::asignar_maquina))
        .route("/{id}", get(handler::detalle).put(handler::actualizar))
        .route("/{id}/entregar", post(handler::entregar))
        .layer(middleware::from_fn(require_staff));

    // 客户路由：自助下单和个人订单
    let cliente_routes = Router::new()
        .route("/mios", get(handler::mis_pedidos))
        .route("/autoservicio", post(handler::crear_autoservicio))
        .route("/itemizado", post(handler::crear_itemizado))
        .layer(middleware::from_fn(require_cliente));

    public_routes.merge(staff_routes).merge(cliente_routes)
}
