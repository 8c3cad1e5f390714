use aulagrid::models::*;
use aulagrid::scheduling::conflict::{
    bloques_se_solapan, detectar_conflictos, dimensiones_en_conflicto,
};
use aulagrid::store::Store;

fn escenario() -> (Store, i64, i64) {
    let store = Store::abrir_en_memoria().unwrap();
    let periodo = store
        .crear_periodo(&NuevoPeriodo {
            gestion: 2026,
            numero: 1,
            fecha_inicio: "2026-02-02".to_string(),
            fecha_fin: "2026-06-30".to_string(),
        })
        .unwrap()
        .id;
    let calendario = store
        .crear_calendario(&NuevoCalendario { periodo, nombre: None, duracion_bloque_min: Some(45) })
        .unwrap()
        .id;
    // 5 bloques de 45' desde las 08:00
    let inicios = ["08:00", "08:45", "09:30", "10:15", "11:00"];
    for (i, h) in inicios.iter().enumerate() {
        store
            .crear_bloque(&NuevoBloque {
                calendario,
                orden: (i + 1) as i32,
                hora_inicio: h.to_string(),
                duracion_min: None,
            })
            .unwrap();
    }
    (store, periodo, calendario)
}

fn docente(store: &Store, nombre: &str) -> i64 {
    store
        .crear_docente(&NuevoDocente {
            nombre_completo: nombre.to_string(),
            especialidad: None,
            carga_min_semanal: None,
            carga_max_semanal: None,
        })
        .unwrap()
        .id
}

fn grupo(store: &Store, periodo: i64, codigo: &str) -> i64 {
    let turno = store.crear_turno("Mañana").unwrap().id;
    let asignatura = store
        .crear_asignatura(&NuevaAsignatura {
            carrera: None,
            codigo: format!("ASIG-{}", codigo),
            nombre: format!("Asignatura {}", codigo),
            horas_teoria_semana: Some(3),
            horas_practica_semana: Some(0),
            tipo_ambiente_teoria: None,
            tipo_ambiente_practica: None,
        })
        .unwrap()
        .id;
    store
        .crear_grupo(&NuevoGrupo {
            asignatura,
            periodo,
            turno,
            docente: None,
            codigo: Some(codigo.to_string()),
            capacidad: Some(30),
        })
        .unwrap()
        .id
}

fn clase(store: &Store, grupo: i64, dia: i32, bloque: i32, dur: i32, docente: Option<i64>) -> i64 {
    store
        .crear_clases_bulk(
            &[NuevaClase {
                grupo,
                tipo: ClaseTipo::T,
                day_of_week: dia,
                bloque_inicio: bloque,
                bloques_duracion: Some(dur),
                ambiente: None,
                docente,
                estado: Some(ClaseEstado::Confirmado),
            }],
            5,
        )
        .unwrap()[0]
        .id
}

#[test]
fn test_bloques_se_solapan_semiabierto() {
    assert!(bloques_se_solapan(2, 2, 3, 1)); // [2,4) y [3,4)
    assert!(!bloques_se_solapan(1, 2, 3, 1)); // [1,3) y [3,4): solo tocan el límite
}

#[test]
fn test_mismo_docente_mismo_bloque_un_conflicto() {
    let (store, periodo, _cal) = escenario();
    let d = docente(&store, "Dr. Rojas");
    let g1 = grupo(&store, periodo, "A1");
    let g2 = grupo(&store, periodo, "B1");
    let a = clase(&store, g1, 1, 2, 1, Some(d));
    let b = clase(&store, g2, 1, 2, 1, Some(d));

    let conflictos = detectar_conflictos(&store, periodo, None, true).unwrap();
    assert_eq!(conflictos.len(), 1);
    assert_eq!(conflictos[0].tipo, ConflictoTipo::Docente);
    let (ca, cb) = (conflictos[0].clase_a, conflictos[0].clase_b);
    assert_eq!((ca.min(cb), ca.max(cb)), (a.min(b), a.max(b)));
}

#[test]
fn test_deteccion_idempotente() {
    let (store, periodo, _cal) = escenario();
    let d = docente(&store, "Dr. Rojas");
    let g1 = grupo(&store, periodo, "A1");
    let g2 = grupo(&store, periodo, "B1");
    clase(&store, g1, 1, 2, 1, Some(d));
    clase(&store, g2, 1, 2, 1, Some(d));

    let primera = detectar_conflictos(&store, periodo, None, true).unwrap();
    assert_eq!(primera.len(), 1);
    // sin escrituras de por medio, la segunda corrida no abre nada nuevo
    let segunda = detectar_conflictos(&store, periodo, None, true).unwrap();
    assert!(segunda.is_empty());
    let abiertos = store
        .listar_conflictos()
        .unwrap()
        .into_iter()
        .filter(|c| !c.resuelto)
        .count();
    assert_eq!(abiertos, 1);
}

#[test]
fn test_deteccion_sin_persistir_no_escribe() {
    let (store, periodo, _cal) = escenario();
    let d = docente(&store, "Dr. Rojas");
    let g1 = grupo(&store, periodo, "A1");
    let g2 = grupo(&store, periodo, "B1");
    clase(&store, g1, 1, 2, 1, Some(d));
    clase(&store, g2, 1, 2, 1, Some(d));

    let transitorios = detectar_conflictos(&store, periodo, None, false).unwrap();
    assert_eq!(transitorios.len(), 1);
    assert_eq!(transitorios[0].id, 0);
    assert!(store.listar_conflictos().unwrap().is_empty());
}

#[test]
fn test_par_con_varias_dimensiones_emite_varios() {
    let (store, periodo, _cal) = escenario();
    let d = docente(&store, "Dra. Paz");
    let g = grupo(&store, periodo, "A1");
    // mismo grupo y mismo docente, solapados: GRUPO + DOCENTE
    let a = store.obtener_clase(clase(&store, g, 2, 1, 2, Some(d))).unwrap();
    let b = store.obtener_clase(clase(&store, g, 2, 2, 1, Some(d))).unwrap();

    let dims = dimensiones_en_conflicto(&a, &b);
    assert!(dims.contains(&ConflictoTipo::Docente));
    assert!(dims.contains(&ConflictoTipo::Grupo));

    let conflictos = detectar_conflictos(&store, periodo, None, true).unwrap();
    assert_eq!(conflictos.len(), 2);
}

#[test]
fn test_docentes_sin_asignar_no_chocan() {
    let (store, periodo, _cal) = escenario();
    let g1 = grupo(&store, periodo, "A1");
    let g2 = grupo(&store, periodo, "B1");
    // ambos sin docente ni ambiente, grupos distintos: nada que reportar
    clase(&store, g1, 1, 2, 1, None);
    clase(&store, g2, 1, 2, 1, None);
    let conflictos = detectar_conflictos(&store, periodo, None, true).unwrap();
    assert!(conflictos.is_empty());
}

#[test]
fn test_clase_cancelada_no_participa() {
    let (store, periodo, _cal) = escenario();
    let d = docente(&store, "Dr. Rojas");
    let g1 = grupo(&store, periodo, "A1");
    let g2 = grupo(&store, periodo, "B1");
    clase(&store, g1, 1, 2, 1, Some(d));
    let cancelada = store
        .crear_clases_bulk(
            &[NuevaClase {
                grupo: g2,
                tipo: ClaseTipo::T,
                day_of_week: 1,
                bloque_inicio: 2,
                bloques_duracion: Some(1),
                ambiente: None,
                docente: Some(d),
                estado: Some(ClaseEstado::Cancelado),
            }],
            5,
        )
        .unwrap();
    assert_eq!(cancelada.len(), 1);
    let conflictos = detectar_conflictos(&store, periodo, None, true).unwrap();
    assert!(conflictos.is_empty());
}

#[test]
fn test_resolver_marca_sin_reverificar() {
    let (store, periodo, _cal) = escenario();
    let d = docente(&store, "Dr. Rojas");
    let g1 = grupo(&store, periodo, "A1");
    let g2 = grupo(&store, periodo, "B1");
    clase(&store, g1, 1, 2, 1, Some(d));
    clase(&store, g2, 1, 2, 1, Some(d));

    let conflictos = detectar_conflictos(&store, periodo, None, true).unwrap();
    let resuelto = store.resolver_conflicto(conflictos[0].id).unwrap();
    assert!(resuelto.resuelto);

    // el solape sigue existiendo: una nueva detección lo vuelve a abrir
    let reabiertos = detectar_conflictos(&store, periodo, None, true).unwrap();
    assert_eq!(reabiertos.len(), 1);
}
