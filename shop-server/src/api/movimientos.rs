//! 操作员审计记录 API
//!
//! | 路径 | 方法 | 说明 | 认证 |
//! |------|------|------|------|
//! | /api/movimientos | GET | 操作历史, 最新在前 | 管理员 |

use axum::{
    Json, Router, middleware,
    extract::{Query, State},
    routing::get,
};
use serde::Deserialize;

use crate::auth::require_admin;
use crate::core::ServerState;
use crate::db::repository::movimiento;
use crate::utils::AppResult;
use shared::models::MovimientoView;

pub fn router() -> Router<ServerState> {
    Router::new()
        .route("/api/movimientos", get(listar))
        .layer(middleware::from_fn(require_admin))
}

/// Query params for the movement history
#[derive(Debug, Deserialize)]
pub struct ListQuery {
    #[serde(default = "default_limit")]
    pub limit: i64,
    #[serde(default)]
    pub offset: i64,
}

fn default_limit() -> i64 {
    50
}

/// GET /api/movimientos - 审计记录列表
pub async fn listar(
    State(state): State<ServerState>,
    Query(query): Query<ListQuery>,
) -> AppResult<Json<Vec<MovimientoView>>> {
    let limit = query.limit.clamp(1, 500);
    let offset = query.offset.max(0);
    let movimientos = movimiento::listar(state.pool(), limit, offset).await?;
    Ok(Json(movimientos))
}
