//! Maquina API 模块 (洗衣机/烘干机)
//!
//! 原注册表是按动作分发的; 这里每个动作一条 JSON 路由。

mod handler;

use axum::{
    Router, middleware,
    routing::{delete, get, post},
};

use crate::auth::require_staff;
use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/maquinas", routes())
}

fn routes() -> Router<ServerState> {
    Router::new()
        .route("/", get(handler::estatus).post(handler::agregar))
        .route("/{id}", delete(handler::baja_definitiva))
        .route("/{id}/mantenimiento", post(handler::reportar_mantenimiento))
        .route("/{id}/toggle", post(handler::toggle_uso))
        .route("/{id}/reactivar", post(handler::reactivar))
        .layer(middleware::from_fn(require_staff))
}
