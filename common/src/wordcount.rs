use crate::partition::KeyValue;

/// Una palabra es una secuencia maximal de letras; cada ocurrencia emite `(palabra, "1")`.
pub fn map(_filename: &str, contents: &str) -> Vec<KeyValue> {
    contents
        .split(|c: char| !c.is_alphabetic())
        .filter(|w| !w.is_empty())
        .map(|w| KeyValue::new(w, "1"))
        .collect()
}

/// Cantidad de ocurrencias de la palabra.
pub fn reduce(_key: &str, values: &[String]) -> String {
    values.len().to_string()
}
