//! 订单生命周期模块 (Pedido Lifecycle)
//!
//! - **lifecycle**: transactional business flows — the three intake paths,
//!   staff updates with machine coupling, standalone machine assignment,
//!   and ticket-validated delivery
//! - **money**: rust_decimal amount helpers
//!
//! # Data Flow
//!
//! ```text
//! Handler → lifecycle (one transaction)
//!             ├─ repository::pedido / maquina / movimiento
//!             ├─ audit row (same transaction)
//!             └─ commit → TicketNotifier (soft-fail side channel)
//! ```
//!
//! Every staff mutation appends exactly one `movimiento_operador` row inside
//! the transaction it describes; order and machine writes are all-or-nothing.

pub mod lifecycle;
pub mod money;

pub use lifecycle::{
    actualizar_pedido, asignar_maquina, crear_autoservicio, crear_itemizado,
    crear_pedido_operador, entregar_pedido,
};
