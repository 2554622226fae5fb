use serde::de::DeserializeOwned;
use crate::error::Error;

/// Deserialize with JSON-path context in error messages.
pub fn from_str_with_path<T: DeserializeOwned>(src: &str) -> Result<T, Error> {
    let de = &mut serde_json::Deserializer::from_str(src);
    serde_path_to_error::deserialize::<_, T>(de).map_err(with_path)
}

pub fn from_slice_with_path<T: DeserializeOwned>(bytes: &[u8]) -> Result<T, Error> {
    let de = &mut serde_json::Deserializer::from_slice(bytes);
    serde_path_to_error::deserialize::<_, T>(de).map_err(with_path)
}

fn with_path(err: serde_path_to_error::Error<serde_json::Error>) -> Error {
    let path = err.path().to_string();
    Error::Load(format!("at JSON path {path} → {}", err.into_inner()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, serde::Deserialize)]
    #[allow(dead_code)]
    struct Outer {
        inner: Vec<Inner>,
    }

    #[derive(Debug, serde::Deserialize)]
    #[allow(dead_code)]
    struct Inner {
        ty: crate::ir::Ty,
    }

    #[test]
    fn errors_name_the_failing_path() {
        let src = r#"{ "inner": [ { "ty": "int" }, { "ty": "List<" } ] }"#;
        let err = from_str_with_path::<Outer>(src).unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("inner[1].ty"), "{msg}");
    }

    #[test]
    fn slices_deserialize_like_strings() {
        let ok = from_slice_with_path::<Outer>(br#"{ "inner": [] }"#).unwrap();
        assert!(ok.inner.is_empty());
    }
}
