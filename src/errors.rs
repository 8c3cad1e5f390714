// Taxonomía de errores del API. Todos los handlers devuelven
// `Result<HttpResponse, ApiError>` y el cuerpo de error siempre es un JSON
// con al menos el campo `error`, igual que el resto de los endpoints.

use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use serde_json::json;
use thiserror::Error;

use crate::models::Conflicto;

#[derive(Debug, Error)]
pub enum ApiError {
    /// Entrada malformada o que viola una restricción del modelo
    /// (bloques solapados, códigos duplicados, rangos fuera del calendario).
    #[error("{campo}: {detalle}")]
    Validacion { campo: String, detalle: String },

    /// Id desconocido.
    #[error("{0} no encontrado")]
    NoEncontrado(String),

    /// La escritura produciría solapes y el caller no aceptó conflictos.
    #[error("la operación produce conflictos de horario")]
    ConflictoDetectado(Vec<Conflicto>),

    /// Contención sobre el candado de un calendario, ya reintentado una vez.
    #[error("calendario ocupado por otra operación: {0}")]
    Concurrencia(String),

    #[error("error interno: {0}")]
    Interno(String),
}

impl ApiError {
    pub fn validacion(campo: impl Into<String>, detalle: impl Into<String>) -> Self {
        ApiError::Validacion { campo: campo.into(), detalle: detalle.into() }
    }

    pub fn no_encontrado(que: impl Into<String>) -> Self {
        ApiError::NoEncontrado(que.into())
    }
}

impl From<rusqlite::Error> for ApiError {
    fn from(e: rusqlite::Error) -> Self {
        ApiError::Interno(format!("sqlite: {}", e))
    }
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Validacion { .. } => StatusCode::BAD_REQUEST,
            ApiError::NoEncontrado(_) => StatusCode::NOT_FOUND,
            ApiError::ConflictoDetectado(_) => StatusCode::CONFLICT,
            ApiError::Concurrencia(_) => StatusCode::SERVICE_UNAVAILABLE,
            ApiError::Interno(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let body = match self {
            ApiError::Validacion { campo, detalle } => {
                json!({"error": detalle, "campo": campo})
            }
            ApiError::ConflictoDetectado(conflictos) => {
                json!({"error": self.to_string(), "conflictos": conflictos})
            }
            ApiError::Interno(detalle) => {
                // Los errores inesperados se registran y salen opacos.
                tracing::error!(detalle = %detalle, "error interno");
                json!({"error": "error interno"})
            }
            otro => json!({"error": otro.to_string()}),
        };
        HttpResponse::build(self.status_code()).json(body)
    }
}
