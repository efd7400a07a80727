//! Ticket 发送服务
//!
//! 订单创建提交后，给客户发送带跟踪链接的电子票据。渲染和投递放在
//! [`TicketNotifier`] trait 后面：核心流程从不因邮件服务失败而失败，
//! 投递失败只作为软警告返回给前台。

use async_trait::async_trait;
use chrono_tz::Tz;
use shared::models::Pedido;

use crate::utils::time::millis_to_local;

/// Printable-ticket URL for a folio (QR target on the ticket).
pub fn ticket_url(base_url: &str, folio: &str) -> String {
    format!(
        "{}/cliente/rastreo-servicio/?folio={}",
        base_url.trim_end_matches('/'),
        folio
    )
}

#[derive(Debug, thiserror::Error)]
pub enum TicketError {
    #[error("cliente sin email registrado")]
    SinDestinatario,

    #[error("ticket delivery failed: {0}")]
    Delivery(String),
}

/// Outbound ticket notifications.
#[async_trait]
pub trait TicketNotifier: Send + Sync {
    /// Send the ticket for a freshly created pedido to the client's email.
    async fn enviar_ticket(
        &self,
        pedido: &Pedido,
        destinatario: Option<&str>,
    ) -> Result<(), TicketError>;
}

/// Default notifier: renders the ticket into the log stream. Stands in
/// until an SMTP sender is wired up in deployment.
#[derive(Debug, Clone)]
pub struct LogTicketNotifier {
    base_url: String,
    tz: Tz,
}

impl LogTicketNotifier {
    pub fn new(base_url: impl Into<String>, tz: Tz) -> Self {
        Self {
            base_url: base_url.into(),
            tz,
        }
    }
}

#[async_trait]
impl TicketNotifier for LogTicketNotifier {
    async fn enviar_ticket(
        &self,
        pedido: &Pedido,
        destinatario: Option<&str>,
    ) -> Result<(), TicketError> {
        let email = destinatario.ok_or(TicketError::SinDestinatario)?;
        let url = ticket_url(&self.base_url, &pedido.folio);

        tracing::info!(
            target: "tickets",
            folio = %pedido.folio,
            destinatario = email,
            asunto = format!("Tu Ticket de Servicio - {}", pedido.folio),
            recepcion = %millis_to_local(pedido.fecha_recepcion, self.tz),
            total = pedido.total,
            url = %url,
            "Ticket enviado"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::models::{EstadoPago, EstadoPedido, MetodoPago, Origen};

    fn pedido() -> Pedido {
        Pedido {
            id: 1,
            folio: "CK-2025-A1B2".to_string(),
            cliente_id: 2,
            servicio_id: None,
            operador_id: Some(3),
            tipo_servicio: "Lavado por Encargo".to_string(),
            peso: 4.5,
            cantidad_prendas: 6,
            observaciones: None,
            cobija_tipo: None,
            lavado_especial: false,
            total: 135.0,
            metodo_pago: MetodoPago::Efectivo,
            estado: EstadoPedido::Pendiente,
            estado_pago: EstadoPago::Pendiente,
            origen: Origen::Operador,
            fecha_recepcion: 1_700_000_000_000,
            fecha_entrega_estimada: None,
            fecha_entrega_real: None,
        }
    }

    #[test]
    fn test_ticket_url() {
        assert_eq!(
            ticket_url("http://localhost:8000", "CK-2025-A1B2"),
            "http://localhost:8000/cliente/rastreo-servicio/?folio=CK-2025-A1B2"
        );
        // trailing slash does not double up
        assert_eq!(
            ticket_url("https://puntolimpio.mx/", "CK-2025-A1B2"),
            "https://puntolimpio.mx/cliente/rastreo-servicio/?folio=CK-2025-A1B2"
        );
    }

    #[tokio::test]
    async fn test_log_notifier() {
        let tz: Tz = "America/Mexico_City".parse().unwrap();
        let notifier = LogTicketNotifier::new("http://localhost:8000", tz);

        let result = notifier
            .enviar_ticket(&pedido(), Some("maria@example.com"))
            .await;
        assert!(result.is_ok());

        let err = notifier.enviar_ticket(&pedido(), None).await.unwrap_err();
        assert!(matches!(err, TicketError::SinDestinatario));
    }
}
