//! 订单业务流程 (transactional lifecycle)
//!
//! Module-level async functions over [`ServerState`]: each one opens a
//! transaction, applies the mutation plus its audit row, re-reads the
//! canonical snapshot and commits. An early `?`/return drops the
//! transaction, which rolls everything back.
//!
//! Machine acquisition goes through [`repository::maquina::ocupar`], a
//! conditional UPDATE, so two staff members racing for one machine can
//! never both win it.

use sqlx::{Sqlite, Transaction};

use crate::auth::CurrentUser;
use crate::core::{ModoMaquinas, ServerState};
use crate::db::repository::{self, RepoError};
use crate::db::repository::pedido::{DetalleNuevo, PedidoNuevo};
use crate::orders::money;
use crate::services::ticket_url;
use crate::utils::time;
use crate::utils::validation::{
    validate_cantidad, validate_optional_text, validate_peso, MAX_NOTA_LEN, MAX_TEXTO_CORTO_LEN,
};
use crate::utils::{AppError, AppResult, ErrorCode};
use shared::folio::generate_folio;
use shared::models::{
    Accion, AsignacionMaquina, AutoservicioCreate, EstadoPedido, MaquinaView, Origen, OrigenNota,
    Pedido, PedidoCreado, PedidoCreate, PedidoItemizadoCreate, PedidoUpdate, TipoMaquina,
    TipoServicio,
};
use shared::util::now_millis;

/// Folio regeneration attempts before giving up with `FolioConflict`
const MAX_INTENTOS_FOLIO: u32 = 5;

/// Machine cycle minutes when the caller sends none (or zero)
const TIEMPO_CICLO_DEFAULT: i64 = 30;

fn db(err: sqlx::Error) -> AppError {
    AppError::database(err.to_string())
}

/// Counter intake: tipo slug → the label printed on the ticket.
fn nombre_tipo_operador(tipo: &str) -> String {
    match tipo {
        "normal" | "por_encargo" => "Lavado por Encargo",
        "autoservicio" => "Autoservicio",
        "planchado" => "Solo Planchado",
        "tintoreria" => "Tintoreria",
        "a_domicilio" => "Servicio a domicilio",
        otro => otro,
    }
    .to_string()
}

/// Client itemized intake: tipo slug → label, unknown slugs read "Servicio".
fn nombre_tipo_cliente(tipo: Option<&str>) -> String {
    match tipo {
        Some("autoservicio") => "Autoservicio",
        Some("por_encargo") => "Servicio por encargo",
        Some("a_domicilio") => "Servicio a domicilio",
        Some("tintoreria") => "Tintoreria",
        _ => "Servicio",
    }
    .to_string()
}

fn tipo_catalogo(tipo: &str) -> Option<TipoServicio> {
    match tipo {
        "autoservicio" => Some(TipoServicio::Autoservicio),
        "por_encargo" => Some(TipoServicio::PorEncargo),
        "a_domicilio" => Some(TipoServicio::ADomicilio),
        "tintoreria" => Some(TipoServicio::Tintoreria),
        _ => None,
    }
}

/// Insert a new order, regenerating the folio on a unique-constraint hit.
/// The failed statement leaves the transaction usable, so the retry rides
/// the same transaction as everything else.
async fn insertar_con_folio(
    tx: &mut Transaction<'_, Sqlite>,
    pedido: &mut PedidoNuevo,
) -> AppResult<i64> {
    for _ in 0..MAX_INTENTOS_FOLIO {
        pedido.folio = generate_folio();
        match repository::pedido::insertar(tx, pedido).await {
            Ok(id) => return Ok(id),
            Err(RepoError::Duplicate(_)) => {
                tracing::warn!(folio = %pedido.folio, "Colision de folio, regenerando");
            }
            Err(e) => return Err(e.into()),
        }
    }
    Err(AppError::with_message(
        ErrorCode::FolioConflict,
        "No se pudo generar un folio unico",
    ))
}

async fn releer_pedido(tx: &mut Transaction<'_, Sqlite>, id: i64) -> AppResult<Pedido> {
    repository::pedido::find_by_id_tx(tx, id)
        .await?
        .ok_or_else(|| AppError::internal("Pedido no encontrado tras escribir"))
}

/// Counter registration by staff. The client must resolve to an active
/// cuenta with rol cliente. Audits `registro_servicio` with the folio as
/// detail; the ticket email runs after commit and only ever downgrades the
/// success message to a warning.
pub async fn crear_pedido_operador(
    state: &ServerState,
    operador: &CurrentUser,
    data: PedidoCreate,
) -> AppResult<(PedidoCreado, String)> {
    validate_peso(data.peso, "peso")?;
    money::validar_monto(data.total, "total").map_err(AppError::validation)?;
    if let Some(cantidad) = data.cantidad_prendas {
        validate_cantidad(cantidad, "cantidad_prendas")?;
    }
    validate_optional_text(&data.observaciones, "observaciones", MAX_NOTA_LEN)?;
    validate_optional_text(&data.cobija_tipo, "cobija_tipo", MAX_TEXTO_CORTO_LEN)?;
    validate_optional_text(&data.tipo_servicio, "tipo_servicio", MAX_TEXTO_CORTO_LEN)?;
    if let Some(fecha) = &data.fecha_entrega {
        time::parse_date(fecha)?;
    }

    let pool = state.pool();
    let cliente = repository::usuario::find_cliente_activo(pool, data.cliente_id)
        .await?
        .ok_or_else(|| {
            AppError::with_message(ErrorCode::ClienteNotFound, "Cliente no encontrado")
        })?;

    let ahora = now_millis();
    let mut nuevo = PedidoNuevo {
        folio: String::new(),
        cliente_id: cliente.id,
        servicio_id: None,
        operador_id: Some(operador.id),
        tipo_servicio: nombre_tipo_operador(
            data.tipo_servicio.as_deref().unwrap_or("por_encargo"),
        ),
        peso: data.peso,
        cantidad_prendas: data.cantidad_prendas.unwrap_or(0),
        observaciones: data.observaciones,
        cobija_tipo: data.cobija_tipo,
        lavado_especial: data.lavado_especial,
        total: money::redondear(data.total),
        metodo_pago: data.metodo_pago.unwrap_or_default(),
        origen: Origen::Operador,
        fecha_recepcion: ahora,
        fecha_entrega_estimada: data.fecha_entrega,
    };

    let mut tx = pool.begin().await.map_err(db)?;
    let pedido_id = insertar_con_folio(&mut tx, &mut nuevo).await?;
    repository::movimiento::registrar(
        &mut tx,
        operador.id,
        Accion::RegistroServicio,
        &nuevo.folio,
        Some(pedido_id),
        ahora,
    )
    .await?;
    let pedido = releer_pedido(&mut tx, pedido_id).await?;
    tx.commit().await.map_err(db)?;

    let mut mensaje = String::from("Servicio registrado exitosamente");
    let url = ticket_url(&state.config.ticket_base_url, &pedido.folio);
    if let Err(e) = state
        .tickets
        .enviar_ticket(&pedido, cliente.email.as_deref())
        .await
    {
        tracing::warn!(folio = %pedido.folio, error = %e, "No se pudo enviar el ticket");
        mensaje.push_str(". Aviso: no se pudo enviar el ticket");
    }

    Ok((
        PedidoCreado {
            id: pedido.id,
            folio: pedido.folio,
            total: pedido.total,
            ticket_url: Some(url),
        },
        mensaje,
    ))
}

/// Client self-service order: flat, no line items, no audit row. The
/// servicio reference is best-effort; an unknown id just leaves it unset.
pub async fn crear_autoservicio(
    state: &ServerState,
    cliente: &CurrentUser,
    data: AutoservicioCreate,
) -> AppResult<(PedidoCreado, String)> {
    money::validar_monto(data.total, "total").map_err(AppError::validation)?;
    validate_optional_text(&data.servicio_nombre, "servicio_nombre", MAX_TEXTO_CORTO_LEN)?;

    let pool = state.pool();
    let servicio = match data.servicio_id {
        Some(id) => repository::catalogo::find_servicio(pool, id).await?,
        None => None,
    };

    let ahora = now_millis();
    let mut nuevo = PedidoNuevo {
        folio: String::new(),
        cliente_id: cliente.id,
        servicio_id: servicio.as_ref().map(|s| s.id),
        operador_id: None,
        tipo_servicio: data
            .servicio_nombre
            .unwrap_or_else(|| "Autoservicio".to_string()),
        peso: 0.0,
        cantidad_prendas: 0,
        observaciones: None,
        cobija_tipo: None,
        lavado_especial: false,
        total: money::redondear(data.total),
        metodo_pago: data.metodo_pago.unwrap_or_default(),
        origen: Origen::Cliente,
        fecha_recepcion: ahora,
        fecha_entrega_estimada: None,
    };

    let mut tx = pool.begin().await.map_err(db)?;
    let pedido_id = insertar_con_folio(&mut tx, &mut nuevo).await?;
    let pedido = releer_pedido(&mut tx, pedido_id).await?;
    tx.commit().await.map_err(db)?;

    Ok((
        PedidoCreado {
            id: pedido.id,
            folio: pedido.folio,
            total: pedido.total,
            ticket_url: None,
        },
        String::from("Servicio registrado exitosamente"),
    ))
}

/// Client itemized order. Garment references resolve before the
/// transaction; a line whose prenda does not exist is dropped, but its
/// peso/cantidad still count toward the order aggregates. Stored subtotals
/// are always recomputed as precio × cantidad.
pub async fn crear_itemizado(
    state: &ServerState,
    cliente: &CurrentUser,
    data: PedidoItemizadoCreate,
) -> AppResult<(PedidoCreado, String)> {
    money::validar_monto(data.total, "total").map_err(AppError::validation)?;
    for linea in &data.prendas {
        validate_peso(linea.peso, "peso")?;
        money::validar_monto(linea.precio, "precio").map_err(AppError::validation)?;
        if let Some(cantidad) = linea.cantidad {
            validate_cantidad(cantidad, "cantidad")?;
        }
    }

    let pool = state.pool();
    let tipo = data.tipo_servicio.as_deref();
    let servicio = match tipo.and_then(tipo_catalogo) {
        Some(t) => repository::catalogo::find_servicio_por_tipo(pool, t).await?,
        None => None,
    };

    let mut lineas = Vec::new();
    let mut peso_total = 0.0_f64;
    let mut cantidad_total = 0_i32;
    for linea in &data.prendas {
        peso_total += linea.peso;
        cantidad_total += linea.cantidad.unwrap_or(0);
        let Some(prenda) = repository::catalogo::find_prenda(pool, linea.prenda_id).await? else {
            tracing::warn!(prenda_id = linea.prenda_id, "Prenda desconocida, linea omitida");
            continue;
        };
        let cantidad = linea.cantidad.unwrap_or(1);
        lineas.push(DetalleNuevo {
            prenda_id: Some(prenda.id),
            cantidad,
            peso: linea.peso,
            precio_unitario: linea.precio,
            subtotal: money::subtotal_linea(linea.precio, cantidad),
        });
    }

    let ahora = now_millis();
    let mut nuevo = PedidoNuevo {
        folio: String::new(),
        cliente_id: cliente.id,
        servicio_id: servicio.as_ref().map(|s| s.id),
        operador_id: None,
        tipo_servicio: nombre_tipo_cliente(tipo),
        peso: peso_total,
        cantidad_prendas: cantidad_total,
        observaciones: None,
        cobija_tipo: None,
        lavado_especial: false,
        total: money::redondear(data.total),
        metodo_pago: data.metodo_pago.unwrap_or_default(),
        origen: Origen::Cliente,
        fecha_recepcion: ahora,
        fecha_entrega_estimada: None,
    };

    let mut tx = pool.begin().await.map_err(db)?;
    let pedido_id = insertar_con_folio(&mut tx, &mut nuevo).await?;
    for linea in &lineas {
        repository::pedido::insertar_detalle(&mut tx, pedido_id, linea).await?;
    }
    let pedido = releer_pedido(&mut tx, pedido_id).await?;
    tx.commit().await.map_err(db)?;

    Ok((
        PedidoCreado {
            id: pedido.id,
            folio: pedido.folio,
            total: pedido.total,
            ticket_url: None,
        },
        String::from("Servicio registrado exitosamente"),
    ))
}

/// Staff update: estado / estado_pago / note, absent fields untouched.
///
/// Entering en_proceso with a maquina_id binds that machine through the
/// acquisition CAS. When the machine is not available the outcome depends
/// on [`ModoMaquinas`]: estricto fails the whole update, flexible lets the
/// update through and reports the skipped assignment in the message.
/// fecha_entrega_real is written only on the first transition to entregado;
/// entregado/cancelado release any machine still bound to the order.
pub async fn actualizar_pedido(
    state: &ServerState,
    operador: &CurrentUser,
    pedido_id: i64,
    data: PedidoUpdate,
) -> AppResult<(Pedido, String)> {
    validate_optional_text(&data.notas, "notas", MAX_NOTA_LEN)?;

    let pool = state.pool();
    let ahora = now_millis();
    let mut tx = pool.begin().await.map_err(db)?;

    let pedido = repository::pedido::find_by_id_tx(&mut tx, pedido_id)
        .await?
        .ok_or_else(|| AppError::new(ErrorCode::PedidoNotFound))?;

    let mut mensaje = String::from("Pedido actualizado exitosamente");

    if data.estado == Some(EstadoPedido::EnProceso)
        && let Some(maquina_id) = data.maquina_id
    {
        let maquina = repository::maquina::find_by_id_tx(&mut tx, maquina_id)
            .await?
            .ok_or_else(|| AppError::new(ErrorCode::MaquinaNotFound))?;
        let tiempo = data
            .tiempo_asignado
            .filter(|t| *t > 0)
            .unwrap_or(TIEMPO_CICLO_DEFAULT);
        if repository::maquina::ocupar(&mut tx, maquina.id, pedido.id, tiempo).await? {
            let nota = format!("Maquina {} asignada por {} minutos", maquina.nombre, tiempo);
            repository::pedido::insertar_nota(&mut tx, pedido.id, OrigenNota::Sistema, &nota, ahora)
                .await?;
        } else {
            match state.config.modo_maquinas {
                ModoMaquinas::Estricto => {
                    return Err(AppError::with_message(
                        ErrorCode::MaquinaNoDisponible,
                        format!("Maquina {} no disponible", maquina.nombre),
                    ));
                }
                ModoMaquinas::Flexible => {
                    mensaje.push_str(". Aviso: la maquina no estaba disponible y no fue asignada");
                }
            }
        }
    }

    repository::pedido::actualizar_estados(&mut tx, pedido.id, data.estado, data.estado_pago)
        .await?;

    if let Some(notas) = data.notas.as_deref()
        && !notas.trim().is_empty()
    {
        repository::pedido::insertar_nota(
            &mut tx,
            pedido.id,
            OrigenNota::Operador,
            notas.trim(),
            ahora,
        )
        .await?;
    }

    if data.estado == Some(EstadoPedido::Entregado) {
        repository::pedido::fijar_fecha_entrega_real(&mut tx, pedido.id, ahora).await?;
    }
    if matches!(
        data.estado,
        Some(EstadoPedido::Entregado | EstadoPedido::Cancelado)
    ) {
        repository::maquina::liberar_de_pedido(&mut tx, pedido.id).await?;
    }

    let detalle = format!(
        "Actualizo pedido {} - Estado: {}, Pago: {}",
        pedido.folio,
        data.estado.map(|e| e.as_str()).unwrap_or("sin cambio"),
        data.estado_pago.map(|e| e.as_str()).unwrap_or("sin cambio"),
    );
    repository::movimiento::registrar(
        &mut tx,
        operador.id,
        Accion::Actualizo,
        &detalle,
        Some(pedido.id),
        ahora,
    )
    .await?;

    let actualizado = releer_pedido(&mut tx, pedido.id).await?;
    tx.commit().await.map_err(db)?;

    Ok((actualizado, mensaje))
}

/// Standalone machine assignment. Unlike the coupled update this path
/// always reports a non-available machine as an error. A lavadora forces
/// the order to en_proceso; a secadora leaves the order status alone.
pub async fn asignar_maquina(
    state: &ServerState,
    operador: &CurrentUser,
    data: AsignacionMaquina,
) -> AppResult<(MaquinaView, String)> {
    let tiempo = data.tiempo.filter(|t| *t > 0).unwrap_or(TIEMPO_CICLO_DEFAULT);
    let pool = state.pool();
    let ahora = now_millis();
    let mut tx = pool.begin().await.map_err(db)?;

    let pedido = repository::pedido::find_by_id_tx(&mut tx, data.pedido_id)
        .await?
        .ok_or_else(|| AppError::new(ErrorCode::PedidoNotFound))?;
    let maquina = repository::maquina::find_by_id_tx(&mut tx, data.maquina_id)
        .await?
        .ok_or_else(|| AppError::new(ErrorCode::MaquinaNotFound))?;

    if !repository::maquina::ocupar(&mut tx, maquina.id, pedido.id, tiempo).await? {
        return Err(AppError::with_message(
            ErrorCode::MaquinaNoDisponible,
            format!("Maquina {} no disponible", maquina.nombre),
        ));
    }

    if maquina.tipo == TipoMaquina::Lavadora {
        repository::pedido::actualizar_estados(
            &mut tx,
            pedido.id,
            Some(EstadoPedido::EnProceso),
            None,
        )
        .await?;
    }

    let detalle = format!(
        "Asigno maquina {} al pedido {} por {} minutos",
        maquina.nombre, pedido.folio, tiempo
    );
    repository::movimiento::registrar(
        &mut tx,
        operador.id,
        Accion::Actualizo,
        &detalle,
        Some(pedido.id),
        ahora,
    )
    .await?;

    let ocupada = repository::maquina::find_by_id_tx(&mut tx, maquina.id)
        .await?
        .ok_or_else(|| AppError::internal("Maquina no encontrada tras asignar"))?;
    tx.commit().await.map_err(db)?;

    Ok((
        MaquinaView::at(ocupada, now_millis()),
        String::from("Maquina asignada exitosamente"),
    ))
}

/// Ticket-validated delivery. Only listo orders deliver; a pending payment
/// settles as efectivo on the spot and any machine still bound to the
/// order is released. Delivering twice is rejected before any write.
pub async fn entregar_pedido(
    state: &ServerState,
    operador: &CurrentUser,
    pedido_id: i64,
) -> AppResult<(Pedido, String)> {
    let pool = state.pool();
    let ahora = now_millis();
    let mut tx = pool.begin().await.map_err(db)?;

    let pedido = repository::pedido::find_by_id_tx(&mut tx, pedido_id)
        .await?
        .ok_or_else(|| AppError::new(ErrorCode::PedidoNotFound))?;

    if pedido.estado == EstadoPedido::Entregado {
        return Err(AppError::with_message(
            ErrorCode::PedidoYaEntregado,
            format!("El pedido {} ya fue entregado", pedido.folio),
        ));
    }
    if !repository::pedido::marcar_entregado(&mut tx, pedido.id, ahora).await? {
        return Err(AppError::with_message(
            ErrorCode::PedidoNoListo,
            format!("El pedido {} no esta listo para entrega", pedido.folio),
        ));
    }
    repository::pedido::pagar_al_entregar(&mut tx, pedido.id).await?;
    repository::maquina::liberar_de_pedido(&mut tx, pedido.id).await?;

    let detalle = format!("Entrego pedido {}", pedido.folio);
    repository::movimiento::registrar(
        &mut tx,
        operador.id,
        Accion::Entrego,
        &detalle,
        Some(pedido.id),
        ahora,
    )
    .await?;

    let entregado = releer_pedido(&mut tx, pedido.id).await?;
    tx.commit().await.map_err(db)?;

    Ok((entregado, String::from("Pedido entregado exitosamente")))
}
