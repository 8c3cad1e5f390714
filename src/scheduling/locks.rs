// Candados consultivos por (periodo, calendario). Las operaciones por lotes
// que leen-modifican-escriben la tabla de clases (detección persistente,
// asignación de aulas, movimientos, altas/bajas en lote) toman el candado
// de su calendario; corridas sobre calendarios distintos no se estorban.

use std::collections::HashMap;
use std::sync::{Arc, Mutex as StdMutex};
use std::time::Duration;

use tokio::sync::{Mutex, OwnedMutexGuard};

use crate::errors::ApiError;

#[derive(Default)]
pub struct CalendarLocks {
    locks: StdMutex<HashMap<(i64, i64), Arc<Mutex<()>>>>,
}

impl CalendarLocks {
    pub fn new() -> Self {
        Self::default()
    }

    fn candado(&self, periodo: i64, calendario: i64) -> Arc<Mutex<()>> {
        let mut mapa = match self.locks.lock() {
            Ok(g) => g,
            Err(e) => e.into_inner(),
        };
        mapa.entry((periodo, calendario)).or_insert_with(|| Arc::new(Mutex::new(()))).clone()
    }

    /// Toma el candado del calendario. Si está ocupado reintenta una única
    /// vez tras una espera corta; si sigue ocupado devuelve error de
    /// concurrencia para que el cliente reintente.
    pub async fn adquirir(&self, periodo: i64, calendario: i64) -> Result<OwnedMutexGuard<()>, ApiError> {
        let lock = self.candado(periodo, calendario);
        if let Ok(guard) = lock.clone().try_lock_owned() {
            return Ok(guard);
        }
        tokio::time::sleep(Duration::from_millis(150)).await;
        lock.try_lock_owned().map_err(|_| {
            ApiError::Concurrencia(format!("periodo {} / calendario {}", periodo, calendario))
        })
    }
}
