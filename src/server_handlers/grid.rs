// Handlers de grilla semanal, cargas docentes y planificación de grupos.

use actix_web::{web, HttpResponse};
use serde::Deserialize;

use crate::errors::ApiError;
use crate::scheduling::cargas::{cargas_docentes, plan_grupos, PlanGruposParams};
use crate::scheduling::grid::{proyectar_grid, GridRequest};
use crate::server::AppState;

pub async fn grid_semana(
    data: web::Data<AppState>,
    body: web::Json<GridRequest>,
) -> Result<HttpResponse, ApiError> {
    Ok(HttpResponse::Ok().json(proyectar_grid(&data.store, &body)?))
}

#[derive(Debug, Deserialize)]
pub struct CargasQuery {
    pub calendario: i64,
    pub periodo: i64,
}

pub async fn cargas(
    data: web::Data<AppState>,
    query: web::Query<CargasQuery>,
) -> Result<HttpResponse, ApiError> {
    Ok(HttpResponse::Ok().json(cargas_docentes(&data.store, query.calendario, query.periodo)?))
}

pub async fn planificacion(
    data: web::Data<AppState>,
    query: web::Query<PlanGruposParams>,
) -> Result<HttpResponse, ApiError> {
    Ok(HttpResponse::Ok().json(plan_grupos(&data.store, &query)?))
}
