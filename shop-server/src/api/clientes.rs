//! 客户搜索 API (柜台登记用)
//!
//! | 路径 | 方法 | 说明 | 认证 |
//! |------|------|------|------|
//! | /api/clientes?q= | GET | 按用户名/姓名/电话搜索客户 | 员工 |

use axum::{
    Json, Router, middleware,
    extract::{Query, State},
    routing::get,
};
use serde::Deserialize;

use crate::auth::require_staff;
use crate::core::ServerState;
use crate::db::repository::usuario;
use crate::utils::AppResult;
use shared::models::ClienteResumen;

/// Matches the counter-screen autocomplete: at least two characters,
/// at most ten results.
const MIN_QUERY_LEN: usize = 2;
const MAX_RESULTADOS: i32 = 10;

pub fn router() -> Router<ServerState> {
    Router::new()
        .route("/api/clientes", get(buscar))
        .layer(middleware::from_fn(require_staff))
}

#[derive(Debug, Deserialize)]
pub struct BusquedaQuery {
    #[serde(default)]
    pub q: String,
}

/// GET /api/clientes?q= - 搜索客户
pub async fn buscar(
    State(state): State<ServerState>,
    Query(query): Query<BusquedaQuery>,
) -> AppResult<Json<Vec<ClienteResumen>>> {
    let q = query.q.trim();
    if q.len() < MIN_QUERY_LEN {
        return Ok(Json(Vec::new()));
    }

    let usuarios = usuario::buscar_clientes(state.pool(), q, MAX_RESULTADOS).await?;
    let clientes = usuarios.iter().map(ClienteResumen::from).collect();
    Ok(Json(clientes))
}
