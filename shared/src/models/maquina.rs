//! Maquina Models

use serde::{Deserialize, Serialize};

/// Machine type
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
#[cfg_attr(feature = "db", derive(sqlx::Type))]
#[cfg_attr(feature = "db", sqlx(rename_all = "snake_case"))]
pub enum TipoMaquina {
    Lavadora,
    Secadora,
}

/// Machine state
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
#[cfg_attr(feature = "db", derive(sqlx::Type))]
#[cfg_attr(feature = "db", sqlx(rename_all = "snake_case"))]
pub enum EstadoMaquina {
    #[default]
    Disponible,
    Ocupado,
    Mantenimiento,
}

/// Maquina entity
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct Maquina {
    pub id: i64,
    pub nombre: String,
    pub tipo: TipoMaquina,
    pub estado: EstadoMaquina,
    pub descripcion_falla: Option<String>,
    /// Pedido currently bound to this machine
    pub pedido_actual: Option<i64>,
    /// Unix millis when the current use started
    pub hora_inicio_uso: Option<i64>,
    /// Assigned duration in minutes
    pub tiempo_asignado: i64,
}

impl Maquina {
    /// Minutes left on the occupancy timer at `now_millis`.
    ///
    /// Always 0 unless the machine is ocupado with a recorded start time.
    /// Never negative; recomputed on every read, nothing is stored.
    pub fn tiempo_restante(&self, now_millis: i64) -> i64 {
        if self.estado != EstadoMaquina::Ocupado {
            return 0;
        }
        let Some(inicio) = self.hora_inicio_uso else {
            return 0;
        };
        let restante_ms = self.tiempo_asignado * 60_000 - (now_millis - inicio);
        if restante_ms <= 0 {
            0
        } else {
            restante_ms / 60_000
        }
    }
}

/// Register machine payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MaquinaCreate {
    pub nombre: String,
    pub tipo: TipoMaquina,
}

/// Report maintenance payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MaquinaMantenimiento {
    pub descripcion: Option<String>,
}

/// Standalone machine assignment payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AsignacionMaquina {
    pub pedido_id: i64,
    pub maquina_id: i64,
    /// Minutes; absent or zero falls back to the default cycle
    pub tiempo: Option<i64>,
}

/// Machine with computed timer (for list views)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MaquinaView {
    #[serde(flatten)]
    pub maquina: Maquina,
    pub tiempo_restante: i64,
}

impl MaquinaView {
    pub fn at(maquina: Maquina, now_millis: i64) -> Self {
        let tiempo_restante = maquina.tiempo_restante(now_millis);
        Self {
            maquina,
            tiempo_restante,
        }
    }
}

/// Machines grouped by type (estatus board)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MaquinasAgrupadas {
    pub lavadoras: Vec<MaquinaView>,
    pub secadoras: Vec<MaquinaView>,
}
