use std::collections::BTreeSet;

use crate::partition::KeyValue;

/// Índice invertido: emite `(palabra, documento)` una vez por palabra distinta del documento.
pub fn map(document: &str, contents: &str) -> Vec<KeyValue> {
    let words: BTreeSet<&str> = contents
        .split(|c: char| !c.is_alphabetic())
        .filter(|w| !w.is_empty())
        .collect();

    words
        .into_iter()
        .map(|w| KeyValue::new(w, document))
        .collect()
}

/// `"<cantidad> <doc1>,<doc2>,..."` con los documentos ordenados.
pub fn reduce(_key: &str, values: &[String]) -> String {
    let mut docs: Vec<&str> = values.iter().map(String::as_str).collect();
    docs.sort_unstable();
    docs.dedup();
    format!("{} {}", docs.len(), docs.join(","))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn map_emite_cada_palabra_una_sola_vez_por_documento() {
        let kvs = map("a.txt", "gato perro gato");
        assert_eq!(
            kvs,
            vec![KeyValue::new("gato", "a.txt"), KeyValue::new("perro", "a.txt")]
        );
    }

    #[test]
    fn reduce_ordena_y_cuenta_documentos() {
        let values = vec!["b.txt".to_string(), "a.txt".to_string()];
        assert_eq!(reduce("gato", &values), "2 a.txt,b.txt");
    }
}
