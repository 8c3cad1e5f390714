// Servidor HTTP: estado compartido, CORS y tabla de rutas.

use actix_cors::Cors;
use actix_web::{web, App, HttpResponse, HttpServer, Responder};
use serde_json::json;

use crate::scheduling::locks::CalendarLocks;
use crate::server_handlers::{asignacion, bloques, catalogo, clases, conflictos, disponibilidad, grid};
use crate::store::Store;

/// Estado compartido entre workers: el almacén y los candados por calendario.
pub struct AppState {
    pub store: Store,
    pub locks: CalendarLocks,
}

pub async fn run_server(bind_addr: &str) -> std::io::Result<()> {
    let store = Store::abrir().map_err(|e| std::io::Error::other(e.to_string()))?;
    let data = web::Data::new(AppState { store, locks: CalendarLocks::new() });

    HttpServer::new(move || {
        App::new()
            .app_data(data.clone())
            .wrap(Cors::permissive())
            // calendarios y bloques
            .route("/api/scheduling/calendarios/", web::get().to(bloques::listar_calendarios))
            .route("/api/scheduling/calendarios/create/", web::post().to(bloques::crear_calendario))
            .route("/api/scheduling/bloques/", web::get().to(bloques::listar_bloques))
            .route("/api/scheduling/bloques/create/", web::post().to(bloques::crear_bloque))
            .route("/api/scheduling/bloques/{id}/update/", web::put().to(bloques::actualizar_bloque))
            .route("/api/scheduling/bloques/{id}/delete/", web::delete().to(bloques::eliminar_bloque))
            // disponibilidad
            .route("/api/scheduling/disponibilidad/", web::get().to(disponibilidad::listar))
            .route("/api/scheduling/disponibilidad/create/", web::post().to(disponibilidad::crear))
            .route("/api/scheduling/disponibilidad/{id}/update/", web::put().to(disponibilidad::actualizar))
            .route("/api/scheduling/disponibilidad/{id}/delete/", web::delete().to(disponibilidad::eliminar))
            .route("/api/scheduling/disponibilidad/import-csv/", web::post().to(disponibilidad::importar_csv))
            // conflictos y movimientos
            .route("/api/scheduling/conflictos/detectar/", web::post().to(conflictos::detectar))
            .route("/api/scheduling/conflictos/", web::get().to(conflictos::listar))
            .route("/api/scheduling/conflictos/{id}/resolver/", web::post().to(conflictos::resolver))
            .route("/api/scheduling/dnd/mover/", web::post().to(conflictos::mover))
            .route("/api/scheduling/cambios/", web::get().to(conflictos::listar_cambios))
            // asignación
            .route("/api/scheduling/asignacion/docentes/proponer/", web::post().to(asignacion::proponer))
            .route("/api/scheduling/aulas/asignar/", web::post().to(asignacion::asignar))
            // grilla y cargas
            .route("/api/scheduling/grid/semana/", web::post().to(grid::grid_semana))
            .route("/api/scheduling/cargas/docentes/", web::get().to(grid::cargas))
            .route("/api/academics/grupos/planificacion/", web::get().to(grid::planificacion))
            // clases
            .route("/api/academics/grupos/{id}/clases/", web::get().to(clases::clases_de_grupo))
            .route("/api/academics/clases/bulk-create/", web::post().to(clases::bulk_create))
            .route("/api/academics/clases/bulk-delete/", web::post().to(clases::bulk_delete))
            .route("/api/scheduling/clasesPrev/", web::get().to(clases::clases_preview))
            .route("/api/scheduling/clasesPrev/{id}/substituto/", web::patch().to(clases::set_substituto))
            // catálogo
            .route("/api/academics/periodos/", web::get().to(catalogo::listar_periodos))
            .route("/api/academics/periodos/create/", web::post().to(catalogo::crear_periodo))
            .route("/api/academics/turnos/", web::get().to(catalogo::listar_turnos))
            .route("/api/academics/turnos/create/", web::post().to(catalogo::crear_turno))
            .route("/api/academics/asignaturas/", web::get().to(catalogo::listar_asignaturas))
            .route("/api/academics/asignaturas/create/", web::post().to(catalogo::crear_asignatura))
            .route("/api/academics/grupos/", web::get().to(catalogo::listar_grupos))
            .route("/api/academics/grupos/create/", web::post().to(catalogo::crear_grupo))
            .route("/api/users/docentes/", web::get().to(catalogo::listar_docentes))
            .route("/api/users/docentes/create/", web::post().to(catalogo::crear_docente))
            .route("/api/facilities/edificios/", web::get().to(catalogo::listar_edificios))
            .route("/api/facilities/edificios/create/", web::post().to(catalogo::crear_edificio))
            .route("/api/facilities/tipos-ambiente/", web::get().to(catalogo::listar_tipos_ambiente))
            .route("/api/facilities/tipos-ambiente/create/", web::post().to(catalogo::crear_tipo_ambiente))
            .route("/api/facilities/ambientes/", web::get().to(catalogo::listar_ambientes))
            .route("/api/facilities/ambientes/create/", web::post().to(catalogo::crear_ambiente))
            .route("/help", web::get().to(help_handler))
    })
    .bind(bind_addr)?
    .run()
    .await
}

async fn help_handler() -> impl Responder {
    let help = json!({
        "description": "API de planificación de horarios: calendarios y bloques, disponibilidad docente, detección y resolución de conflictos, propuesta de docentes, auto-asignación de aulas, grilla semanal y cargas.",
        "detectar_example": {"periodo": 1, "calendario": 1, "persistir": true},
        "mover_example": {"clase": 10, "new_day_of_week": 2, "new_bloque_inicio": 3, "new_bloques_duracion": 2, "dry_run": true},
        "proponer_example": {"periodo": 1, "calendario": 1, "prefer_especialidad": true, "persistir": false},
        "asignar_example": {"periodo": 1, "calendario": 1, "prefer_edificio": 2, "force": false},
        "grid_example": {"periodo": 1, "calendario": 1, "docente": null, "grupo": null, "ambiente": null},
        "note": "day_of_week va de 1 (lunes) a 7 (domingo); bloque_inicio es el orden del bloque en el calendario."
    });
    HttpResponse::Ok().json(help)
}
