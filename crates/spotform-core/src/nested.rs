//! Helpers for composite (list/set of blocks) attributes
//!
//! Element-level shape problems are tolerated: a non-block element is
//! skipped, and a cap-one list whose only element is malformed expands to
//! an empty block. A slot holding something other than a collection is an
//! error.

use crate::error::{ReconcileError, Result, SchemaError};
use crate::field::FieldName;
use crate::value::{ConfigMap, ConfigValue};

/// Items of a list/set slot, or a parse failure for any other shape
pub fn expect_items(field: FieldName, value: &ConfigValue) -> Result<&[ConfigValue]> {
    value.as_items().ok_or_else(|| {
        ReconcileError::parse(
            field,
            SchemaError::TypeMismatch {
                path: field.to_string(),
                expected: "list",
                found: value.kind(),
            },
        )
    })
}

/// First block of a cap-one list
///
/// `Ok(None)` when the slot is absent or empty.
pub fn first_block(field: FieldName, value: Option<&ConfigValue>) -> Result<Option<ConfigMap>> {
    let Some(value) = value else {
        return Ok(None);
    };
    let Some(first) = expect_items(field, value)?.first() else {
        return Ok(None);
    };
    match first.as_block() {
        Some(block) => Ok(Some(block.clone())),
        None => {
            tracing::debug!(
                "[{}]: element is a {}, not a block; using defaults",
                field,
                first.kind()
            );
            Ok(Some(ConfigMap::new()))
        }
    }
}

/// All block elements of a list/set, skipping anything else
pub fn blocks(field: FieldName, value: Option<&ConfigValue>) -> Result<Vec<&ConfigMap>> {
    let Some(value) = value else {
        return Ok(Vec::new());
    };
    Ok(expect_items(field, value)?
        .iter()
        .filter_map(|item| {
            let block = item.as_block();
            if block.is_none() {
                tracing::debug!("[{}]: skipping {} element", field, item.kind());
            }
            block
        })
        .collect())
}

/// Wrap one block as a cap-one list
pub fn single_block(block: ConfigMap) -> ConfigValue {
    ConfigValue::List(vec![ConfigValue::Block(block)])
}

/// Non-empty string attribute of a block
pub fn block_str<'a>(block: &'a ConfigMap, key: &str) -> Option<&'a str> {
    block
        .get(key)
        .and_then(ConfigValue::as_str)
        .filter(|s| !s.is_empty())
}

pub fn block_bool(block: &ConfigMap, key: &str) -> Option<bool> {
    block.get(key).and_then(ConfigValue::as_bool)
}

pub fn block_int(block: &ConfigMap, key: &str) -> Option<i64> {
    block.get(key).and_then(ConfigValue::as_int)
}

/// Non-negative integer attribute of a block
pub fn block_count(block: &ConfigMap, key: &str) -> Option<i64> {
    block_int(block, key).filter(|v| *v >= 0)
}

#[cfg(test)]
mod tests {
    use super::*;

    const OPTIONS: FieldName = FieldName::new("options");

    #[test]
    fn test_first_block() {
        assert_eq!(first_block(OPTIONS, None).unwrap(), None);
        assert_eq!(
            first_block(OPTIONS, Some(&ConfigValue::List(vec![]))).unwrap(),
            None
        );

        let value = single_block(ConfigMap::from([("a".to_string(), ConfigValue::Int(1))]));
        let block = first_block(OPTIONS, Some(&value)).unwrap().unwrap();
        assert_eq!(block_int(&block, "a"), Some(1));
    }

    #[test]
    fn test_first_block_malformed_element_uses_defaults() {
        let value = ConfigValue::List(vec![ConfigValue::from("oops")]);
        assert_eq!(
            first_block(OPTIONS, Some(&value)).unwrap(),
            Some(ConfigMap::new())
        );
    }

    #[test]
    fn test_non_collection_is_parse_failure() {
        let err = first_block(OPTIONS, Some(&ConfigValue::from("oops"))).unwrap_err();
        assert!(matches!(err, ReconcileError::FieldParse { field, .. } if field == OPTIONS));
    }

    #[test]
    fn test_blocks_skip_non_block_elements() {
        let value = ConfigValue::Set(vec![
            ConfigValue::block([("name", ConfigValue::from("a"))]),
            ConfigValue::from(true),
            ConfigValue::block([("name", ConfigValue::from("b"))]),
        ]);
        let found = blocks(OPTIONS, Some(&value)).unwrap();
        let names: Vec<_> = found.iter().filter_map(|b| block_str(b, "name")).collect();
        assert_eq!(names, vec!["a", "b"]);
    }

    #[test]
    fn test_block_count_rejects_negative() {
        let block = ConfigMap::from([("n".to_string(), ConfigValue::Int(-1))]);
        assert_eq!(block_count(&block, "n"), None);
    }
}
