// Handlers de disponibilidad docente, incluida la importación CSV.

use actix_web::{web, HttpResponse};
use serde::Deserialize;
use serde_json::json;

use crate::errors::ApiError;
use crate::models::NuevaDisponibilidad;
use crate::server::AppState;

#[derive(Debug, Deserialize)]
pub struct DisponibilidadQuery {
    pub calendario: Option<i64>,
    pub day: Option<i32>,
    pub docente: Option<i64>,
}

pub async fn listar(
    data: web::Data<AppState>,
    query: web::Query<DisponibilidadQuery>,
) -> Result<HttpResponse, ApiError> {
    let filas = data.store.listar_disponibilidad(query.calendario, query.day, query.docente)?;
    Ok(HttpResponse::Ok().json(filas))
}

pub async fn crear(
    data: web::Data<AppState>,
    body: web::Json<NuevaDisponibilidad>,
) -> Result<HttpResponse, ApiError> {
    Ok(HttpResponse::Ok().json(data.store.crear_disponibilidad(&body)?))
}

pub async fn actualizar(
    data: web::Data<AppState>,
    path: web::Path<i64>,
    body: web::Json<NuevaDisponibilidad>,
) -> Result<HttpResponse, ApiError> {
    Ok(HttpResponse::Ok().json(data.store.actualizar_disponibilidad(path.into_inner(), &body)?))
}

pub async fn eliminar(
    data: web::Data<AppState>,
    path: web::Path<i64>,
) -> Result<HttpResponse, ApiError> {
    data.store.eliminar_disponibilidad(path.into_inner())?;
    Ok(HttpResponse::Ok().json(json!({"status": "ok"})))
}

#[derive(Debug, Deserialize)]
pub struct ImportQuery {
    pub calendario: i64,
}

/// POST /api/scheduling/disponibilidad/import-csv/?calendario=
/// Cuerpo: texto CSV plano. Todo o nada.
pub async fn importar_csv(
    data: web::Data<AppState>,
    query: web::Query<ImportQuery>,
    body: web::Bytes,
) -> Result<HttpResponse, ApiError> {
    let texto = std::str::from_utf8(&body)
        .map_err(|_| ApiError::validacion("csv", "el cuerpo no es UTF-8 válido"))?;
    let importadas = data.store.importar_disponibilidad_csv(query.calendario, texto)?;
    Ok(HttpResponse::Ok().json(json!({"status": "ok", "importadas": importadas})))
}
