//! 机器占用集成测试
//!
//! 占用是 CAS 语义（guarded UPDATE）：并发抢同一台机器只允许一个赢家。
//! 同时覆盖联动更新的 estricto/flexible 两种模式和交付/取消时的释放。

use std::sync::Arc;

use shared::ErrorCode;
use shared::models::{
    Accion, AsignacionMaquina, EstadoMaquina, EstadoPedido, MaquinaCreate, PedidoCreate,
    PedidoUpdate, Rol, TipoMaquina,
};
use shop_server::db::repository;
use shop_server::orders;
use shop_server::{Config, CurrentUser, ModoMaquinas, ServerState};
use tempfile::TempDir;
use tokio::sync::Barrier;

async fn sembrar_usuarios(pool: &sqlx::SqlitePool) {
    sqlx::query(
        "INSERT INTO usuario (id, username, nombre, rol) VALUES
            (2, 'maria.lopez', 'Maria Lopez', 'cliente'),
            (3, 'op1', 'Operador Uno', 'operador')",
    )
    .execute(pool)
    .await
    .unwrap();
}

async fn estado_prueba() -> (ServerState, TempDir) {
    let dir = tempfile::tempdir().unwrap();
    let config = Config::with_overrides(dir.path().to_str().unwrap(), 0);
    let state = ServerState::initialize(&config).await;
    sembrar_usuarios(state.pool()).await;
    (state, dir)
}

async fn estado_flexible() -> (ServerState, TempDir) {
    let dir = tempfile::tempdir().unwrap();
    let mut config = Config::with_overrides(dir.path().to_str().unwrap(), 0);
    config.modo_maquinas = ModoMaquinas::Flexible;
    let state = ServerState::initialize(&config).await;
    sembrar_usuarios(state.pool()).await;
    (state, dir)
}

fn operador() -> CurrentUser {
    CurrentUser {
        id: 3,
        username: "op1".to_string(),
        rol: Rol::Operador,
    }
}

async fn nueva_maquina(state: &ServerState, nombre: &str, tipo: TipoMaquina) -> i64 {
    let maquina = repository::maquina::create(
        state.pool(),
        MaquinaCreate {
            nombre: nombre.to_string(),
            tipo,
        },
    )
    .await
    .unwrap();
    maquina.id
}

/// Pedido de mostrador minimo, regresa su id.
async fn pedido_mostrador(state: &ServerState) -> i64 {
    let data = PedidoCreate {
        cliente_id: 2,
        tipo_servicio: None,
        peso: 3.0,
        cantidad_prendas: None,
        observaciones: None,
        cobija_tipo: None,
        lavado_especial: false,
        total: 90.0,
        metodo_pago: None,
        fecha_entrega: None,
    };
    let (creado, _) = orders::crear_pedido_operador(state, &operador(), data)
        .await
        .unwrap();
    creado.id
}

fn sin_cambios() -> PedidoUpdate {
    PedidoUpdate {
        estado: None,
        estado_pago: None,
        notas: None,
        maquina_id: None,
        tiempo_asignado: None,
    }
}

#[tokio::test]
async fn test_asignar_lavadora_activa_pedido() {
    let (state, _dir) = estado_prueba().await;
    let maquina_id = nueva_maquina(&state, "Lavadora 1", TipoMaquina::Lavadora).await;
    let pedido_id = pedido_mostrador(&state).await;

    let data = AsignacionMaquina {
        pedido_id,
        maquina_id,
        tiempo: Some(45),
    };
    let (view, mensaje) = orders::asignar_maquina(&state, &operador(), data)
        .await
        .unwrap();

    assert_eq!(mensaje, "Maquina asignada exitosamente");
    assert_eq!(view.maquina.estado, EstadoMaquina::Ocupado);
    assert_eq!(view.maquina.pedido_actual, Some(pedido_id));
    assert_eq!(view.maquina.tiempo_asignado, 45);
    // El reloj arranca al asignar; el truncado a minutos puede comerse uno
    assert!((44..=45).contains(&view.tiempo_restante));

    let pedido = repository::pedido::find_by_id(state.pool(), pedido_id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(pedido.estado, EstadoPedido::EnProceso);

    let historial = repository::movimiento::listar(state.pool(), 10, 0)
        .await
        .unwrap();
    let asignacion = historial
        .iter()
        .find(|m| m.accion == Accion::Actualizo)
        .unwrap();
    assert_eq!(
        asignacion.detalles,
        format!("Asigno maquina Lavadora 1 al pedido {} por 45 minutos", pedido.folio)
    );
}

#[tokio::test]
async fn test_asignar_secadora_no_toca_estado() {
    let (state, _dir) = estado_prueba().await;
    let maquina_id = nueva_maquina(&state, "Secadora 1", TipoMaquina::Secadora).await;
    let pedido_id = pedido_mostrador(&state).await;

    let data = AsignacionMaquina {
        pedido_id,
        maquina_id,
        tiempo: Some(20),
    };
    let (view, _) = orders::asignar_maquina(&state, &operador(), data)
        .await
        .unwrap();
    assert_eq!(view.maquina.estado, EstadoMaquina::Ocupado);

    let pedido = repository::pedido::find_by_id(state.pool(), pedido_id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(pedido.estado, EstadoPedido::Pendiente);
}

#[tokio::test]
async fn test_tiempo_invalido_usa_ciclo_default() {
    let (state, _dir) = estado_prueba().await;
    let maquina_id = nueva_maquina(&state, "Lavadora 1", TipoMaquina::Lavadora).await;
    let pedido_id = pedido_mostrador(&state).await;

    let data = AsignacionMaquina {
        pedido_id,
        maquina_id,
        tiempo: Some(0),
    };
    let (view, _) = orders::asignar_maquina(&state, &operador(), data)
        .await
        .unwrap();
    assert_eq!(view.maquina.tiempo_asignado, 30);
}

#[tokio::test]
async fn test_asignar_maquina_ocupada_falla() {
    let (state, _dir) = estado_prueba().await;
    let maquina_id = nueva_maquina(&state, "Lavadora 1", TipoMaquina::Lavadora).await;
    let pedido_a = pedido_mostrador(&state).await;
    let pedido_b = pedido_mostrador(&state).await;

    orders::asignar_maquina(
        &state,
        &operador(),
        AsignacionMaquina {
            pedido_id: pedido_a,
            maquina_id,
            tiempo: None,
        },
    )
    .await
    .unwrap();

    let err = orders::asignar_maquina(
        &state,
        &operador(),
        AsignacionMaquina {
            pedido_id: pedido_b,
            maquina_id,
            tiempo: None,
        },
    )
    .await
    .unwrap_err();
    assert_eq!(err.code, ErrorCode::MaquinaNoDisponible);
    assert_eq!(err.message, "Maquina Lavadora 1 no disponible");

    // Sigue amarrada al primer pedido
    let maquina = repository::maquina::find_by_id(state.pool(), maquina_id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(maquina.pedido_actual, Some(pedido_a));
}

#[tokio::test]
async fn test_asignar_referencias_inexistentes() {
    let (state, _dir) = estado_prueba().await;
    let maquina_id = nueva_maquina(&state, "Lavadora 1", TipoMaquina::Lavadora).await;
    let pedido_id = pedido_mostrador(&state).await;

    let err = orders::asignar_maquina(
        &state,
        &operador(),
        AsignacionMaquina {
            pedido_id: 424242,
            maquina_id,
            tiempo: None,
        },
    )
    .await
    .unwrap_err();
    assert_eq!(err.code, ErrorCode::PedidoNotFound);

    let err = orders::asignar_maquina(
        &state,
        &operador(),
        AsignacionMaquina {
            pedido_id,
            maquina_id: 424242,
            tiempo: None,
        },
    )
    .await
    .unwrap_err();
    assert_eq!(err.code, ErrorCode::MaquinaNotFound);
}

#[tokio::test]
async fn test_mantenimiento_bloquea_asignacion() {
    let (state, _dir) = estado_prueba().await;
    let maquina_id = nueva_maquina(&state, "Lavadora 1", TipoMaquina::Lavadora).await;
    let pedido_id = pedido_mostrador(&state).await;

    repository::maquina::reportar_mantenimiento(
        state.pool(),
        maquina_id,
        Some("Tambor atascado".to_string()),
    )
    .await
    .unwrap();

    let err = orders::asignar_maquina(
        &state,
        &operador(),
        AsignacionMaquina {
            pedido_id,
            maquina_id,
            tiempo: None,
        },
    )
    .await
    .unwrap_err();
    assert_eq!(err.code, ErrorCode::MaquinaNoDisponible);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_carrera_asignacion_un_solo_ganador() {
    let (state, _dir) = estado_prueba().await;
    let maquina_id = nueva_maquina(&state, "Lavadora 1", TipoMaquina::Lavadora).await;
    let pedido_a = pedido_mostrador(&state).await;
    let pedido_b = pedido_mostrador(&state).await;

    let barrera = Arc::new(Barrier::new(2));
    let mut tareas = Vec::new();
    for pedido_id in [pedido_a, pedido_b] {
        let state = state.clone();
        let barrera = barrera.clone();
        tareas.push(tokio::spawn(async move {
            barrera.wait().await;
            let resultado = orders::asignar_maquina(
                &state,
                &operador(),
                AsignacionMaquina {
                    pedido_id,
                    maquina_id,
                    tiempo: Some(40),
                },
            )
            .await;
            (pedido_id, resultado.is_ok())
        }));
    }

    let mut ganadores = Vec::new();
    for tarea in tareas {
        let (pedido_id, gano) = tarea.await.unwrap();
        if gano {
            ganadores.push(pedido_id);
        }
    }

    // El perdedor puede ver MaquinaNoDisponible o un conflicto de escritura;
    // lo unico garantizado es que gana exactamente uno
    assert_eq!(ganadores.len(), 1);

    let maquina = repository::maquina::find_by_id(state.pool(), maquina_id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(maquina.estado, EstadoMaquina::Ocupado);
    assert_eq!(maquina.pedido_actual, Some(ganadores[0]));
    assert_eq!(maquina.tiempo_asignado, 40);
}

#[tokio::test]
async fn test_entrega_libera_maquina() {
    let (state, _dir) = estado_prueba().await;
    let maquina_id = nueva_maquina(&state, "Lavadora 1", TipoMaquina::Lavadora).await;
    let pedido_id = pedido_mostrador(&state).await;

    orders::asignar_maquina(
        &state,
        &operador(),
        AsignacionMaquina {
            pedido_id,
            maquina_id,
            tiempo: Some(30),
        },
    )
    .await
    .unwrap();

    let update = PedidoUpdate {
        estado: Some(EstadoPedido::Listo),
        ..sin_cambios()
    };
    orders::actualizar_pedido(&state, &operador(), pedido_id, update)
        .await
        .unwrap();

    let (pedido, _) = orders::entregar_pedido(&state, &operador(), pedido_id)
        .await
        .unwrap();
    assert_eq!(pedido.estado, EstadoPedido::Entregado);

    let maquina = repository::maquina::find_by_id(state.pool(), maquina_id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(maquina.estado, EstadoMaquina::Disponible);
    assert!(maquina.pedido_actual.is_none());
    assert!(maquina.hora_inicio_uso.is_none());
    assert_eq!(maquina.tiempo_asignado, 0);
}

#[tokio::test]
async fn test_cancelar_libera_maquina() {
    let (state, _dir) = estado_prueba().await;
    let maquina_id = nueva_maquina(&state, "Secadora 1", TipoMaquina::Secadora).await;
    let pedido_id = pedido_mostrador(&state).await;

    orders::asignar_maquina(
        &state,
        &operador(),
        AsignacionMaquina {
            pedido_id,
            maquina_id,
            tiempo: None,
        },
    )
    .await
    .unwrap();

    let update = PedidoUpdate {
        estado: Some(EstadoPedido::Cancelado),
        ..sin_cambios()
    };
    let (pedido, _) = orders::actualizar_pedido(&state, &operador(), pedido_id, update)
        .await
        .unwrap();
    assert_eq!(pedido.estado, EstadoPedido::Cancelado);
    // Cancelar no es entregar: sin fecha real de entrega
    assert!(pedido.fecha_entrega_real.is_none());

    let maquina = repository::maquina::find_by_id(state.pool(), maquina_id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(maquina.estado, EstadoMaquina::Disponible);
    assert!(maquina.pedido_actual.is_none());
}

#[tokio::test]
async fn test_update_acoplado_asigna_y_deja_nota() {
    let (state, _dir) = estado_prueba().await;
    let maquina_id = nueva_maquina(&state, "Lavadora 1", TipoMaquina::Lavadora).await;
    let pedido_id = pedido_mostrador(&state).await;

    let update = PedidoUpdate {
        estado: Some(EstadoPedido::EnProceso),
        maquina_id: Some(maquina_id),
        tiempo_asignado: Some(25),
        ..sin_cambios()
    };
    let (pedido, mensaje) = orders::actualizar_pedido(&state, &operador(), pedido_id, update)
        .await
        .unwrap();

    assert_eq!(mensaje, "Pedido actualizado exitosamente");
    assert_eq!(pedido.estado, EstadoPedido::EnProceso);

    let maquina = repository::maquina::find_by_id(state.pool(), maquina_id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(maquina.estado, EstadoMaquina::Ocupado);
    assert_eq!(maquina.pedido_actual, Some(pedido_id));
    assert_eq!(maquina.tiempo_asignado, 25);

    let notas = repository::pedido::notas(state.pool(), pedido_id)
        .await
        .unwrap();
    assert_eq!(notas.len(), 1);
    assert_eq!(notas[0].texto, "Maquina Lavadora 1 asignada por 25 minutos");
}

#[tokio::test]
async fn test_update_acoplado_estricto_revierte_todo() {
    let (state, _dir) = estado_prueba().await;
    let maquina_id = nueva_maquina(&state, "Lavadora 1", TipoMaquina::Lavadora).await;
    let pedido_a = pedido_mostrador(&state).await;
    let pedido_b = pedido_mostrador(&state).await;

    orders::asignar_maquina(
        &state,
        &operador(),
        AsignacionMaquina {
            pedido_id: pedido_b,
            maquina_id,
            tiempo: None,
        },
    )
    .await
    .unwrap();

    let update = PedidoUpdate {
        estado: Some(EstadoPedido::EnProceso),
        notas: Some("Urge".to_string()),
        maquina_id: Some(maquina_id),
        ..sin_cambios()
    };
    let err = orders::actualizar_pedido(&state, &operador(), pedido_a, update)
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::MaquinaNoDisponible);
    assert_eq!(err.message, "Maquina Lavadora 1 no disponible");

    // Nada del update sobrevive: ni estado, ni nota
    let pedido = repository::pedido::find_by_id(state.pool(), pedido_a)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(pedido.estado, EstadoPedido::Pendiente);
    let notas = repository::pedido::notas(state.pool(), pedido_a)
        .await
        .unwrap();
    assert!(notas.is_empty());

    let maquina = repository::maquina::find_by_id(state.pool(), maquina_id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(maquina.pedido_actual, Some(pedido_b));
}

#[tokio::test]
async fn test_update_acoplado_flexible_avisa() {
    let (state, _dir) = estado_flexible().await;
    let maquina_id = nueva_maquina(&state, "Lavadora 1", TipoMaquina::Lavadora).await;
    let pedido_a = pedido_mostrador(&state).await;
    let pedido_b = pedido_mostrador(&state).await;

    orders::asignar_maquina(
        &state,
        &operador(),
        AsignacionMaquina {
            pedido_id: pedido_b,
            maquina_id,
            tiempo: None,
        },
    )
    .await
    .unwrap();

    let update = PedidoUpdate {
        estado: Some(EstadoPedido::EnProceso),
        maquina_id: Some(maquina_id),
        ..sin_cambios()
    };
    let (pedido, mensaje) = orders::actualizar_pedido(&state, &operador(), pedido_a, update)
        .await
        .unwrap();

    // El pedido avanza sin maquina y el mensaje lo advierte
    assert_eq!(
        mensaje,
        "Pedido actualizado exitosamente. Aviso: la maquina no estaba disponible y no fue asignada"
    );
    assert_eq!(pedido.estado, EstadoPedido::EnProceso);

    let maquina = repository::maquina::find_by_id(state.pool(), maquina_id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(maquina.pedido_actual, Some(pedido_b));

    let notas = repository::pedido::notas(state.pool(), pedido_a)
        .await
        .unwrap();
    assert!(notas.is_empty());
}
