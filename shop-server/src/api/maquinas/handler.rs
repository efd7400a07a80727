//! Maquina API Handlers

use axum::{
    Json,
    extract::{Path, State},
};

use crate::core::ServerState;
use crate::db::repository::{RepoError, maquina};
use crate::utils::validation::{MAX_NOMBRE_LEN, validate_optional_text, validate_required_text};
use crate::utils::{ApiResponse, AppError, AppResult, ErrorCode};
use shared::models::{
    EstadoMaquina, MaquinaCreate, MaquinaMantenimiento, MaquinaView, MaquinasAgrupadas,
    TipoMaquina,
};
use shared::util::now_millis;

fn maquina_not_found(err: RepoError) -> AppError {
    match err {
        RepoError::NotFound(_) => AppError::new(ErrorCode::MaquinaNotFound),
        other => other.into(),
    }
}

/// GET /api/maquinas - 状态板, 按类型分组, 含剩余分钟
pub async fn estatus(State(state): State<ServerState>) -> AppResult<Json<MaquinasAgrupadas>> {
    let maquinas = maquina::find_all(state.pool()).await?;
    let ahora = now_millis();

    let mut lavadoras = Vec::new();
    let mut secadoras = Vec::new();
    for m in maquinas {
        let view = MaquinaView::at(m, ahora);
        match view.maquina.tipo {
            TipoMaquina::Lavadora => lavadoras.push(view),
            TipoMaquina::Secadora => secadoras.push(view),
        }
    }

    Ok(Json(MaquinasAgrupadas {
        lavadoras,
        secadoras,
    }))
}

/// POST /api/maquinas - 登记机器
pub async fn agregar(
    State(state): State<ServerState>,
    Json(payload): Json<MaquinaCreate>,
) -> AppResult<ApiResponse<MaquinaView>> {
    validate_required_text(&payload.nombre, "nombre", MAX_NOMBRE_LEN)?;

    let nombre = payload.nombre.clone();
    let creada = match maquina::create(state.pool(), payload).await {
        Ok(m) => m,
        Err(RepoError::Duplicate(_)) => {
            return Err(AppError::with_message(
                ErrorCode::AlreadyExists,
                format!("Ya existe una maquina con el nombre {nombre}"),
            ));
        }
        Err(e) => return Err(e.into()),
    };

    Ok(ApiResponse::success_with_message(
        "Máquina registrada correctamente.",
        MaquinaView::at(creada, now_millis()),
    ))
}

/// DELETE /api/maquinas/{id} - 永久下架 (baja definitiva)
pub async fn baja_definitiva(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> AppResult<ApiResponse<()>> {
    if !maquina::delete(state.pool(), id).await? {
        return Err(AppError::new(ErrorCode::MaquinaNotFound));
    }
    Ok(ApiResponse::ok_with_message("Máquina eliminada."))
}

/// POST /api/maquinas/{id}/mantenimiento - 报修, 任意状态可进入
pub async fn reportar_mantenimiento(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
    Json(payload): Json<MaquinaMantenimiento>,
) -> AppResult<ApiResponse<MaquinaView>> {
    validate_optional_text(&payload.descripcion, "descripcion", MAX_NOMBRE_LEN)?;

    let m = maquina::reportar_mantenimiento(state.pool(), id, payload.descripcion)
        .await
        .map_err(maquina_not_found)?;

    Ok(ApiResponse::success_with_message(
        "Máquina puesta en mantenimiento.",
        MaquinaView::at(m, now_millis()),
    ))
}

/// POST /api/maquinas/{id}/toggle - 快速切换 disponible ⇄ ocupado
///
/// 不触碰计时字段; 维修中的机器拒绝切换。
pub async fn toggle_uso(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> AppResult<ApiResponse<MaquinaView>> {
    let m = maquina::toggle_uso(state.pool(), id)
        .await
        .map_err(maquina_not_found)?;
    if m.estado == EstadoMaquina::Mantenimiento {
        return Err(AppError::with_message(
            ErrorCode::MaquinaEnMantenimiento,
            format!("La maquina {} esta en mantenimiento", m.nombre),
        ));
    }

    Ok(ApiResponse::success(MaquinaView::at(m, now_millis())))
}

/// POST /api/maquinas/{id}/reactivar - 重新上线
///
/// 回到 disponible 并清空 pedido_actual / 计时 / 故障描述。
pub async fn reactivar(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> AppResult<ApiResponse<MaquinaView>> {
    let m = maquina::reactivar(state.pool(), id)
        .await
        .map_err(maquina_not_found)?;

    Ok(ApiResponse::success_with_message(
        "Máquina reactivada y lista para usar.",
        MaquinaView::at(m, now_millis()),
    ))
}
