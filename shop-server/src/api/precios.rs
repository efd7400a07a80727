//! 价目表 API (公共)
//!
//! | 路径 | 方法 | 说明 | 认证 |
//! |------|------|------|------|
//! | /api/precios | GET | 当前有效的prendas + servicios | 无 |

use axum::{Json, Router, extract::State, routing::get};

use crate::core::ServerState;
use crate::db::repository::catalogo;
use crate::utils::AppResult;
use shared::models::Precios;

pub fn router() -> Router<ServerState> {
    Router::new().route("/api/precios", get(obtener_precios))
}

/// GET /api/precios - 价格目录 (客户端计算器用)
pub async fn obtener_precios(State(state): State<ServerState>) -> AppResult<Json<Precios>> {
    let pool = state.pool();
    let prendas = catalogo::prendas_activas(pool).await?;
    let servicios = catalogo::servicios_activos(pool).await?;
    Ok(Json(Precios { prendas, servicios }))
}
