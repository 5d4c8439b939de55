use std::borrow::Cow;

use hashlink::LinkedHashMap;
use saphyr::{Scalar, Yaml};

pub(crate) type Mapping<'input> = LinkedHashMap<Yaml<'input>, Yaml<'input>>;

pub(crate) fn key(name: &'static str) -> Yaml<'static> {
    Yaml::Value(Scalar::String(Cow::Borrowed(name)))
}

pub(crate) fn field<'a, 'input>(
    mapping: &'a Mapping<'input>,
    name: &'static str,
) -> Option<&'a Yaml<'input>> {
    mapping.get(&key(name)).filter(|value| !is_null(value))
}

pub(crate) fn as_integer(value: &Yaml) -> Option<i64> {
    match value {
        Yaml::Value(Scalar::Integer(number)) => Some(*number),
        _ => None,
    }
}

pub(crate) fn as_bool(value: &Yaml) -> Option<bool> {
    match value {
        Yaml::Value(Scalar::Boolean(flag)) => Some(*flag),
        _ => None,
    }
}

/// Scalars read as text, so `name: 1` still yields "1".
pub(crate) fn as_text(value: &Yaml) -> Option<String> {
    match value {
        Yaml::Value(Scalar::String(text)) => Some(text.to_string()),
        Yaml::Value(Scalar::Integer(number)) => Some(number.to_string()),
        Yaml::Value(Scalar::Boolean(flag)) => Some(flag.to_string()),
        _ => None,
    }
}

pub(crate) fn is_null(value: &Yaml) -> bool {
    matches!(value, Yaml::Value(Scalar::Null))
}
