//! 订单生命周期集成测试
//!
//! 使用 ServerState::initialize 完整初始化（真实迁移 + 种子目录），
//! 直接驱动 orders:: 服务层，不经过 HTTP。
//!
//! 覆盖：前台登记 / 自助 / 按件三条创建路径、部分更新、交付结算。

use shared::ErrorCode;
use shared::folio::is_valid_folio;
use shared::models::{
    Accion, AutoservicioCreate, DetallePedidoInput, EstadoPago, EstadoPedido, MetodoPago, Origen,
    OrigenNota, PedidoCreate, PedidoItemizadoCreate, PedidoUpdate, Rol,
};
use shop_server::db::repository;
use shop_server::orders;
use shop_server::{Config, CurrentUser, ServerState};
use tempfile::TempDir;

/// Estado completo sobre un directorio temporal, con un cliente (con y sin
/// email) y un operador sembrados. El TempDir se devuelve para mantener
/// vivo el archivo de la base.
async fn estado_prueba() -> (ServerState, TempDir) {
    let dir = tempfile::tempdir().unwrap();
    let config = Config::with_overrides(dir.path().to_str().unwrap(), 0);
    let state = ServerState::initialize(&config).await;

    sqlx::query(
        "INSERT INTO usuario (id, username, nombre, email, rol) VALUES
            (2, 'maria.lopez', 'Maria Lopez', 'maria@example.com', 'cliente'),
            (3, 'op1', 'Operador Uno', NULL, 'operador'),
            (4, 'pedro.gomez', 'Pedro Gomez', NULL, 'cliente')",
    )
    .execute(state.pool())
    .await
    .unwrap();

    (state, dir)
}

fn operador() -> CurrentUser {
    CurrentUser {
        id: 3,
        username: "op1".to_string(),
        rol: Rol::Operador,
    }
}

fn cliente() -> CurrentUser {
    CurrentUser {
        id: 2,
        username: "maria.lopez".to_string(),
        rol: Rol::Cliente,
    }
}

fn encargo(cliente_id: i64) -> PedidoCreate {
    PedidoCreate {
        cliente_id,
        tipo_servicio: None,
        peso: 4.5,
        cantidad_prendas: Some(6),
        observaciones: Some("Sin suavizante".to_string()),
        cobija_tipo: None,
        lavado_especial: false,
        total: 135.0,
        metodo_pago: None,
        fecha_entrega: Some("2026-09-01".to_string()),
    }
}

#[tokio::test]
async fn test_mostrador_crea_pedido_con_folio_y_ticket() {
    let (state, _dir) = estado_prueba().await;

    let (creado, mensaje) = orders::crear_pedido_operador(&state, &operador(), encargo(2))
        .await
        .unwrap();

    assert!(is_valid_folio(&creado.folio), "folio: {}", creado.folio);
    assert_eq!(creado.total, 135.0);
    assert_eq!(mensaje, "Servicio registrado exitosamente");

    let url = creado.ticket_url.unwrap();
    assert!(url.ends_with(&format!("/cliente/rastreo-servicio/?folio={}", creado.folio)));

    let pedido = repository::pedido::find_by_id(state.pool(), creado.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(pedido.cliente_id, 2);
    assert_eq!(pedido.operador_id, Some(3));
    assert_eq!(pedido.origen, Origen::Operador);
    assert_eq!(pedido.tipo_servicio, "Lavado por Encargo");
    assert_eq!(pedido.peso, 4.5);
    assert_eq!(pedido.cantidad_prendas, 6);
    assert_eq!(pedido.metodo_pago, MetodoPago::Efectivo);
    assert_eq!(pedido.estado, EstadoPedido::Pendiente);
    assert_eq!(pedido.estado_pago, EstadoPago::Pendiente);
    assert_eq!(pedido.fecha_entrega_estimada.as_deref(), Some("2026-09-01"));
    assert!(pedido.fecha_entrega_real.is_none());

    // El registro queda auditado con el folio como detalle
    let historial = repository::movimiento::listar(state.pool(), 10, 0)
        .await
        .unwrap();
    assert_eq!(historial.len(), 1);
    assert_eq!(historial[0].accion, Accion::RegistroServicio);
    assert_eq!(historial[0].detalles, creado.folio);
    assert_eq!(historial[0].operador_username, "op1");
}

#[tokio::test]
async fn test_mostrador_avisa_si_cliente_sin_email() {
    let (state, _dir) = estado_prueba().await;

    let (creado, mensaje) = orders::crear_pedido_operador(&state, &operador(), encargo(4))
        .await
        .unwrap();

    // El pedido se crea igual; el ticket fallido solo degrada el mensaje
    assert_eq!(
        mensaje,
        "Servicio registrado exitosamente. Aviso: no se pudo enviar el ticket"
    );
    assert!(creado.ticket_url.is_some());

    let pedido = repository::pedido::find_by_id(state.pool(), creado.id)
        .await
        .unwrap();
    assert!(pedido.is_some());
}

#[tokio::test]
async fn test_mostrador_rechaza_cliente_desconocido() {
    let (state, _dir) = estado_prueba().await;

    let err = orders::crear_pedido_operador(&state, &operador(), encargo(999))
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::ClienteNotFound);
    assert_eq!(err.message, "Cliente no encontrado");

    // Un operador no cuenta como cliente aunque la cuenta exista
    let err = orders::crear_pedido_operador(&state, &operador(), encargo(3))
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::ClienteNotFound);
}

#[tokio::test]
async fn test_mostrador_valida_entrada() {
    let (state, _dir) = estado_prueba().await;

    let mut data = encargo(2);
    data.peso = -1.0;
    let err = orders::crear_pedido_operador(&state, &operador(), data)
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::ValidationFailed);

    let mut data = encargo(2);
    data.fecha_entrega = Some("01/09/2026".to_string());
    let err = orders::crear_pedido_operador(&state, &operador(), data)
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::ValidationFailed);
}

#[tokio::test]
async fn test_autoservicio_sin_auditoria_ni_ticket() {
    let (state, _dir) = estado_prueba().await;

    let data = AutoservicioCreate {
        servicio_id: Some(1),
        servicio_nombre: Some("Lavadora".to_string()),
        total: 50.0,
        metodo_pago: Some(MetodoPago::Tarjeta),
    };
    let (creado, mensaje) = orders::crear_autoservicio(&state, &cliente(), data)
        .await
        .unwrap();

    assert!(is_valid_folio(&creado.folio));
    assert_eq!(mensaje, "Servicio registrado exitosamente");
    assert!(creado.ticket_url.is_none());

    let pedido = repository::pedido::find_by_id(state.pool(), creado.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(pedido.cliente_id, 2);
    assert_eq!(pedido.origen, Origen::Cliente);
    assert!(pedido.operador_id.is_none());
    assert_eq!(pedido.servicio_id, Some(1));
    assert_eq!(pedido.tipo_servicio, "Lavadora");
    assert_eq!(pedido.peso, 0.0);
    assert_eq!(pedido.metodo_pago, MetodoPago::Tarjeta);

    // Los pedidos de cliente no dejan movimiento de operador
    let historial = repository::movimiento::listar(state.pool(), 10, 0)
        .await
        .unwrap();
    assert!(historial.is_empty());
}

#[tokio::test]
async fn test_itemizado_recalcula_subtotales() {
    let (state, _dir) = estado_prueba().await;

    // Prenda 1 existe en el catalogo sembrado; la 999 no. El subtotal
    // enviado por el cliente es basura a proposito.
    let data = PedidoItemizadoCreate {
        prendas: vec![
            DetallePedidoInput {
                prenda_id: 1,
                cantidad: Some(2),
                peso: 1.5,
                precio: 50.0,
                subtotal: Some(9999.0),
            },
            DetallePedidoInput {
                prenda_id: 999,
                cantidad: Some(1),
                peso: 0.5,
                precio: 80.0,
                subtotal: None,
            },
        ],
        total: 180.0,
        metodo_pago: Some(MetodoPago::Efectivo),
        tipo_servicio: Some("por_encargo".to_string()),
    };
    let (creado, _) = orders::crear_itemizado(&state, &cliente(), data)
        .await
        .unwrap();

    let pedido = repository::pedido::find_by_id(state.pool(), creado.id)
        .await
        .unwrap()
        .unwrap();
    // La linea con prenda desconocida se omite del detalle pero su peso y
    // cantidad cuentan en los agregados del pedido
    assert_eq!(pedido.peso, 2.0);
    assert_eq!(pedido.cantidad_prendas, 3);
    assert_eq!(pedido.tipo_servicio, "Servicio por encargo");
    assert_eq!(pedido.servicio_id, Some(4));
    assert_eq!(pedido.total, 180.0);

    let detalles = repository::pedido::detalles(state.pool(), creado.id)
        .await
        .unwrap();
    assert_eq!(detalles.len(), 1);
    assert_eq!(detalles[0].prenda_id, Some(1));
    assert_eq!(detalles[0].cantidad, 2);
    assert_eq!(detalles[0].peso, 1.5);
    assert_eq!(detalles[0].precio_unitario, 50.0);
    assert_eq!(detalles[0].subtotal, 100.0);
}

#[tokio::test]
async fn test_itemizado_cantidad_ausente() {
    let (state, _dir) = estado_prueba().await;

    let data = PedidoItemizadoCreate {
        prendas: vec![DetallePedidoInput {
            prenda_id: 11,
            cantidad: None,
            peso: 1.0,
            precio: 100.0,
            subtotal: None,
        }],
        total: 100.0,
        metodo_pago: None,
        tipo_servicio: None,
    };
    let (creado, _) = orders::crear_itemizado(&state, &cliente(), data)
        .await
        .unwrap();

    // Sin cantidad: el renglon asume 1, el agregado asume 0
    let detalles = repository::pedido::detalles(state.pool(), creado.id)
        .await
        .unwrap();
    assert_eq!(detalles[0].cantidad, 1);
    assert_eq!(detalles[0].subtotal, 100.0);

    let pedido = repository::pedido::find_by_id(state.pool(), creado.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(pedido.cantidad_prendas, 0);
    assert_eq!(pedido.tipo_servicio, "Servicio");
    assert!(pedido.servicio_id.is_none());
}

#[tokio::test]
async fn test_actualizar_estado_agrega_nota_y_audita() {
    let (state, _dir) = estado_prueba().await;
    let (creado, _) = orders::crear_pedido_operador(&state, &operador(), encargo(2))
        .await
        .unwrap();

    let update = PedidoUpdate {
        estado: Some(EstadoPedido::Listo),
        estado_pago: None,
        notas: Some("  Lista para recoger  ".to_string()),
        maquina_id: None,
        tiempo_asignado: None,
    };
    let (pedido, mensaje) = orders::actualizar_pedido(&state, &operador(), creado.id, update)
        .await
        .unwrap();

    assert_eq!(mensaje, "Pedido actualizado exitosamente");
    assert_eq!(pedido.estado, EstadoPedido::Listo);
    assert_eq!(pedido.estado_pago, EstadoPago::Pendiente);

    let notas = repository::pedido::notas(state.pool(), creado.id)
        .await
        .unwrap();
    assert_eq!(notas.len(), 1);
    assert_eq!(notas[0].origen, OrigenNota::Operador);
    assert_eq!(notas[0].texto, "Lista para recoger");

    let historial = repository::movimiento::listar(state.pool(), 10, 0)
        .await
        .unwrap();
    let cambio = historial
        .iter()
        .find(|m| m.accion == Accion::Actualizo)
        .unwrap();
    assert_eq!(
        cambio.detalles,
        format!("Actualizo pedido {} - Estado: listo, Pago: sin cambio", creado.folio)
    );
    assert_eq!(cambio.pedido_folio.as_deref(), Some(creado.folio.as_str()));
}

#[tokio::test]
async fn test_actualizar_pedido_inexistente() {
    let (state, _dir) = estado_prueba().await;

    let update = PedidoUpdate {
        estado: Some(EstadoPedido::Listo),
        estado_pago: None,
        notas: None,
        maquina_id: None,
        tiempo_asignado: None,
    };
    let err = orders::actualizar_pedido(&state, &operador(), 424242, update)
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::PedidoNotFound);
}

#[tokio::test]
async fn test_entrega_exige_listo() {
    let (state, _dir) = estado_prueba().await;
    let (creado, _) = orders::crear_pedido_operador(&state, &operador(), encargo(2))
        .await
        .unwrap();

    let err = orders::entregar_pedido(&state, &operador(), creado.id)
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::PedidoNoListo);
    assert!(err.message.contains(&creado.folio));

    let pedido = repository::pedido::find_by_id(state.pool(), creado.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(pedido.estado, EstadoPedido::Pendiente);
    assert_eq!(pedido.estado_pago, EstadoPago::Pendiente);
}

#[tokio::test]
async fn test_entrega_liquida_pago_en_efectivo() {
    let (state, _dir) = estado_prueba().await;
    let mut data = encargo(2);
    data.metodo_pago = Some(MetodoPago::Tarjeta);
    let (creado, _) = orders::crear_pedido_operador(&state, &operador(), data)
        .await
        .unwrap();

    let update = PedidoUpdate {
        estado: Some(EstadoPedido::Listo),
        estado_pago: None,
        notas: None,
        maquina_id: None,
        tiempo_asignado: None,
    };
    orders::actualizar_pedido(&state, &operador(), creado.id, update)
        .await
        .unwrap();

    let (pedido, mensaje) = orders::entregar_pedido(&state, &operador(), creado.id)
        .await
        .unwrap();

    assert_eq!(mensaje, "Pedido entregado exitosamente");
    assert_eq!(pedido.estado, EstadoPedido::Entregado);
    assert_eq!(pedido.estado_pago, EstadoPago::Pagado);
    // El pago pendiente se liquida en mostrador, siempre en efectivo
    assert_eq!(pedido.metodo_pago, MetodoPago::Efectivo);
    assert!(pedido.fecha_entrega_real.is_some());

    let historial = repository::movimiento::listar(state.pool(), 10, 0)
        .await
        .unwrap();
    let entrega = historial
        .iter()
        .find(|m| m.accion == Accion::Entrego)
        .unwrap();
    assert_eq!(entrega.detalles, format!("Entrego pedido {}", creado.folio));
}

#[tokio::test]
async fn test_entrega_respeta_pago_previo() {
    let (state, _dir) = estado_prueba().await;
    let mut data = encargo(2);
    data.metodo_pago = Some(MetodoPago::Tarjeta);
    let (creado, _) = orders::crear_pedido_operador(&state, &operador(), data)
        .await
        .unwrap();

    let update = PedidoUpdate {
        estado: Some(EstadoPedido::Listo),
        estado_pago: Some(EstadoPago::Pagado),
        notas: None,
        maquina_id: None,
        tiempo_asignado: None,
    };
    orders::actualizar_pedido(&state, &operador(), creado.id, update)
        .await
        .unwrap();

    let (pedido, _) = orders::entregar_pedido(&state, &operador(), creado.id)
        .await
        .unwrap();

    // Ya estaba pagado con tarjeta; la entrega no lo reescribe
    assert_eq!(pedido.estado_pago, EstadoPago::Pagado);
    assert_eq!(pedido.metodo_pago, MetodoPago::Tarjeta);
}

#[tokio::test]
async fn test_entrega_doble_rechazada() {
    let (state, _dir) = estado_prueba().await;
    let (creado, _) = orders::crear_pedido_operador(&state, &operador(), encargo(2))
        .await
        .unwrap();

    let update = PedidoUpdate {
        estado: Some(EstadoPedido::Listo),
        estado_pago: None,
        notas: None,
        maquina_id: None,
        tiempo_asignado: None,
    };
    orders::actualizar_pedido(&state, &operador(), creado.id, update)
        .await
        .unwrap();

    let (primera, _) = orders::entregar_pedido(&state, &operador(), creado.id)
        .await
        .unwrap();

    let err = orders::entregar_pedido(&state, &operador(), creado.id)
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::PedidoYaEntregado);
    assert!(err.message.contains(&creado.folio));

    // El segundo intento no toca nada: misma fecha real, mismo pago
    let pedido = repository::pedido::find_by_id(state.pool(), creado.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(pedido.fecha_entrega_real, primera.fecha_entrega_real);
    assert_eq!(pedido.estado_pago, EstadoPago::Pagado);
}

#[tokio::test]
async fn test_folios_unicos_en_lote() {
    let (state, _dir) = estado_prueba().await;

    let mut folios = std::collections::HashSet::new();
    for _ in 0..12 {
        let (creado, _) = orders::crear_pedido_operador(&state, &operador(), encargo(2))
            .await
            .unwrap();
        assert!(is_valid_folio(&creado.folio));
        folios.insert(creado.folio);
    }
    assert_eq!(folios.len(), 12);
}
