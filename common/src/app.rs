use anyhow::{bail, Result};

use crate::partition::KeyValue;
use crate::{indexer, wordcount};

/// `(nombre del archivo, contenido) -> pares clave/valor`
pub type MapFn = fn(&str, &str) -> Vec<KeyValue>;

/// `(clave, valores) -> línea de salida para esa clave`
pub type ReduceFn = fn(&str, &[String]) -> String;

/// Par de funciones de usuario que definen un job MapReduce.
/// Ambas son puras y sincrónicas.
#[derive(Debug, Clone, Copy)]
pub struct Application {
    pub name: &'static str,
    pub map: MapFn,
    pub reduce: ReduceFn,
}

pub const WORDCOUNT: Application = Application {
    name: "wc",
    map: wordcount::map,
    reduce: wordcount::reduce,
};

pub const INDEXER: Application = Application {
    name: "indexer",
    map: indexer::map,
    reduce: indexer::reduce,
};

pub const APPLICATIONS: &[Application] = &[WORDCOUNT, INDEXER];

/// Busca una aplicación por nombre ("wc", "indexer").
pub fn lookup(name: &str) -> Result<Application> {
    match APPLICATIONS.iter().find(|a| a.name == name) {
        Some(app) => Ok(*app),
        None => {
            let known: Vec<&str> = APPLICATIONS.iter().map(|a| a.name).collect();
            bail!("aplicación desconocida {:?} (disponibles: {})", name, known.join(", "))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup_encuentra_las_aplicaciones_registradas() {
        assert_eq!(lookup("wc").unwrap().name, "wc");
        assert_eq!(lookup("indexer").unwrap().name, "indexer");
    }

    #[test]
    fn lookup_falla_con_nombre_desconocido() {
        let err = lookup("grep").unwrap_err();
        assert!(err.to_string().contains("grep"));
    }
}
