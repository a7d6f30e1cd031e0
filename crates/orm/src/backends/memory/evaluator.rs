//! Filter, update and projection evaluation over JSON documents
//!
//! Supports the subset of the document query language the mapper emits:
//! equality (array fields match on any element), the comparison operators
//! `$eq $ne $gt $gte $lt $lte $in $nin $exists $regex`, top-level `$and` /
//! `$or`, and dotted paths into nested objects and arrays.

use std::cmp::Ordering;

use regex::RegexBuilder;
use serde_json::{Map, Value};

use crate::document::{value_kind, Document, ID_FIELD};
use crate::error::{OrmError, OrmResult};
use crate::query::SortDirection;

/// Resolve a dotted path against a document
pub fn get_path<'a>(document: &'a Document, path: &str) -> Option<&'a Value> {
    let mut segments = path.split('.');
    let mut current = document.get(segments.next()?)?;

    for segment in segments {
        current = match current {
            Value::Object(map) => map.get(segment)?,
            Value::Array(items) => items.get(segment.parse::<usize>().ok()?)?,
            _ => return None,
        };
    }

    Some(current)
}

fn set_path(document: &mut Document, path: &str, value: Value) -> OrmResult<()> {
    let (parents, last) = match path.rsplit_once('.') {
        Some((parents, last)) => (Some(parents), last),
        None => (None, path),
    };

    let mut target = document;
    if let Some(parents) = parents {
        for segment in parents.split('.') {
            let entry = target
                .entry(segment.to_string())
                .or_insert_with(|| Value::Object(Map::new()));
            target = match entry {
                Value::Object(map) => map,
                other => {
                    return Err(OrmError::Query(format!(
                        "Cannot create field '{}' in element of type {}",
                        last,
                        value_kind(other)
                    )))
                }
            };
        }
    }

    target.insert(last.to_string(), value);
    Ok(())
}

fn remove_path(document: &mut Document, path: &str) {
    match path.rsplit_once('.') {
        None => {
            document.remove(path);
        }
        Some((parents, last)) => {
            let mut target = document;
            for segment in parents.split('.') {
                target = match target.get_mut(segment) {
                    Some(Value::Object(map)) => map,
                    _ => return,
                };
            }
            target.remove(last);
        }
    }
}

fn type_rank(value: Option<&Value>) -> u8 {
    match value {
        None | Some(Value::Null) => 0,
        Some(Value::Number(_)) => 1,
        Some(Value::String(_)) => 2,
        Some(Value::Object(_)) => 3,
        Some(Value::Array(_)) => 4,
        Some(Value::Bool(_)) => 5,
    }
}

/// Compare two scalars of the same kind; `None` for mismatched kinds
pub fn compare_values(left: &Value, right: &Value) -> Option<Ordering> {
    match (left, right) {
        (Value::Null, Value::Null) => Some(Ordering::Equal),
        (Value::Number(a), Value::Number(b)) => a.as_f64()?.partial_cmp(&b.as_f64()?),
        (Value::String(a), Value::String(b)) => Some(a.cmp(b)),
        (Value::Bool(a), Value::Bool(b)) => Some(a.cmp(b)),
        _ => None,
    }
}

/// Total order used for sorting: missing and null first, then by kind
pub fn sort_cmp(left: Option<&Value>, right: Option<&Value>) -> Ordering {
    let by_rank = type_rank(left).cmp(&type_rank(right));
    if by_rank != Ordering::Equal {
        return by_rank;
    }

    match (left, right) {
        (Some(a), Some(b)) => compare_values(a, b).unwrap_or_else(|| a.to_string().cmp(&b.to_string())),
        _ => Ordering::Equal,
    }
}

fn values_equal(left: &Value, right: &Value) -> bool {
    match compare_values(left, right) {
        Some(ordering) => ordering == Ordering::Equal,
        None => left == right,
    }
}

/// Equality with array-contains semantics and missing-equals-null
pub(crate) fn field_equals(field: Option<&Value>, expected: &Value) -> bool {
    match field {
        None => expected.is_null(),
        Some(Value::Array(items)) if !expected.is_array() => {
            items.iter().any(|item| values_equal(item, expected))
        }
        Some(value) => values_equal(value, expected),
    }
}

fn field_compares(field: Option<&Value>, operand: &Value, accept: fn(Ordering) -> bool) -> bool {
    match field {
        None => false,
        Some(Value::Array(items)) if !operand.is_array() => items
            .iter()
            .any(|item| compare_values(item, operand).is_some_and(accept)),
        Some(value) => compare_values(value, operand).is_some_and(accept),
    }
}

fn operand_array<'a>(operator: &str, operand: &'a Value) -> OrmResult<&'a Vec<Value>> {
    operand
        .as_array()
        .ok_or_else(|| OrmError::Query(format!("{} needs an array, got {}", operator, value_kind(operand))))
}

fn is_operator_object(condition: &Value) -> Option<&Map<String, Value>> {
    match condition {
        Value::Object(map) if !map.is_empty() && map.keys().all(|key| key.starts_with('$')) => {
            Some(map)
        }
        _ => None,
    }
}

fn matches_regex(field: Option<&Value>, pattern: &Value, options: Option<&Value>) -> OrmResult<bool> {
    let pattern = pattern
        .as_str()
        .ok_or_else(|| OrmError::Query(format!("$regex needs a string, got {}", value_kind(pattern))))?;
    let flags = options.and_then(Value::as_str).unwrap_or("");

    let regex = RegexBuilder::new(pattern)
        .case_insensitive(flags.contains('i'))
        .multi_line(flags.contains('m'))
        .dot_matches_new_line(flags.contains('s'))
        .build()
        .map_err(|e| OrmError::Query(format!("Invalid $regex '{}': {}", pattern, e)))?;

    Ok(match field {
        Some(Value::String(text)) => regex.is_match(text),
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(Value::as_str)
            .any(|text| regex.is_match(text)),
        _ => false,
    })
}

fn matches_operators(field: Option<&Value>, operators: &Map<String, Value>) -> OrmResult<bool> {
    for (operator, operand) in operators {
        let matched = match operator.as_str() {
            "$eq" => field_equals(field, operand),
            "$ne" => !field_equals(field, operand),
            "$gt" => field_compares(field, operand, Ordering::is_gt),
            "$gte" => field_compares(field, operand, Ordering::is_ge),
            "$lt" => field_compares(field, operand, Ordering::is_lt),
            "$lte" => field_compares(field, operand, Ordering::is_le),
            "$in" => operand_array(operator, operand)?
                .iter()
                .any(|candidate| field_equals(field, candidate)),
            "$nin" => !operand_array(operator, operand)?
                .iter()
                .any(|candidate| field_equals(field, candidate)),
            "$exists" => field.is_some() == is_truthy(operand),
            "$regex" => matches_regex(field, operand, operators.get("$options"))?,
            "$options" => {
                if !operators.contains_key("$regex") {
                    return Err(OrmError::Query("$options needs a $regex".to_string()));
                }
                true
            }
            other => return Err(OrmError::Query(format!("Unknown operator: {}", other))),
        };

        if !matched {
            return Ok(false);
        }
    }

    Ok(true)
}

fn sub_filters<'a>(operator: &str, operand: &'a Value) -> OrmResult<Vec<&'a Document>> {
    let items = operand_array(operator, operand)?;
    if items.is_empty() {
        return Err(OrmError::Query(format!("{} needs a non-empty array", operator)));
    }

    items
        .iter()
        .map(|item| {
            item.as_object().ok_or_else(|| {
                OrmError::Query(format!("{} entries must be objects, got {}", operator, value_kind(item)))
            })
        })
        .collect()
}

/// Whether `document` satisfies `filter`; an empty filter matches everything
pub fn matches(document: &Document, filter: &Document) -> OrmResult<bool> {
    for (key, condition) in filter {
        let matched = match key.as_str() {
            "$and" => {
                let mut all = true;
                for sub in sub_filters(key, condition)? {
                    if !matches(document, sub)? {
                        all = false;
                        break;
                    }
                }
                all
            }
            "$or" => {
                let mut any = false;
                for sub in sub_filters(key, condition)? {
                    if matches(document, sub)? {
                        any = true;
                        break;
                    }
                }
                any
            }
            other if other.starts_with('$') => {
                return Err(OrmError::Query(format!("Unknown top-level operator: {}", other)))
            }
            path => {
                let field = get_path(document, path);
                match is_operator_object(condition) {
                    Some(operators) => matches_operators(field, operators)?,
                    None => field_equals(field, condition),
                }
            }
        };

        if !matched {
            return Ok(false);
        }
    }

    Ok(true)
}

/// Stable multi-key sort
pub fn sort_documents(documents: &mut [Document], keys: &[(String, SortDirection)]) {
    if keys.is_empty() {
        return;
    }

    documents.sort_by(|a, b| {
        for (field, direction) in keys {
            let ordering = sort_cmp(get_path(a, field), get_path(b, field));
            let ordering = match direction {
                SortDirection::Asc => ordering,
                SortDirection::Desc => ordering.reverse(),
            };
            if ordering != Ordering::Equal {
                return ordering;
            }
        }
        Ordering::Equal
    });
}

fn operator_fields<'a>(operator: &str, operand: &'a Value) -> OrmResult<&'a Map<String, Value>> {
    operand.as_object().ok_or_else(|| {
        OrmError::Query(format!("Modifier {} needs an object, got {}", operator, value_kind(operand)))
    })
}

/// Apply an update document in place; returns whether anything changed
pub fn apply_update(document: &mut Document, update: &Document) -> OrmResult<bool> {
    if update.is_empty() {
        return Err(OrmError::Query("Update document must not be empty".to_string()));
    }

    let original = document.clone();
    let mut updated = document.clone();

    for (operator, operand) in update {
        if !operator.starts_with('$') {
            return Err(OrmError::Query(format!(
                "Update documents may only contain operators, found field '{}'",
                operator
            )));
        }

        let fields = operator_fields(operator, operand)?;
        match operator.as_str() {
            "$set" => {
                for (path, value) in fields {
                    if path == ID_FIELD && original.get(ID_FIELD) != Some(value) {
                        return Err(immutable_id());
                    }
                    set_path(&mut updated, path, value.clone())?;
                }
            }
            "$unset" => {
                for path in fields.keys() {
                    if path == ID_FIELD {
                        return Err(immutable_id());
                    }
                    remove_path(&mut updated, path);
                }
            }
            "$inc" => {
                for (path, delta) in fields {
                    if path == ID_FIELD {
                        return Err(immutable_id());
                    }
                    let next = increment(get_path(&updated, path), delta, path)?;
                    set_path(&mut updated, path, next)?;
                }
            }
            other => {
                return Err(OrmError::Query(format!("Unknown update operator: {}", other)))
            }
        }
    }

    let changed = updated != original;
    *document = updated;
    Ok(changed)
}

fn immutable_id() -> OrmError {
    OrmError::Query("Performing an update on the path '_id' would modify the immutable field '_id'".to_string())
}

fn increment(current: Option<&Value>, delta: &Value, path: &str) -> OrmResult<Value> {
    let delta_number = delta
        .as_f64()
        .ok_or_else(|| OrmError::Query(format!("Cannot increment with non-numeric {}", value_kind(delta))))?;

    match current {
        None | Some(Value::Null) => Ok(delta.clone()),
        Some(Value::Number(n)) => match (n.as_i64(), delta.as_i64()) {
            (Some(a), Some(b)) => a
                .checked_add(b)
                .map(Value::from)
                .ok_or_else(|| OrmError::Query(format!("Increment overflows field '{}'", path))),
            _ => {
                let base = n.as_f64().unwrap_or_default();
                serde_json::Number::from_f64(base + delta_number)
                    .map(Value::Number)
                    .ok_or_else(|| OrmError::Query(format!("Increment of '{}' is not finite", path)))
            }
        },
        Some(other) => Err(OrmError::Query(format!(
            "Cannot apply $inc to field '{}' of type {}",
            path,
            value_kind(other)
        ))),
    }
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Bool(flag) => *flag,
        Value::Number(n) => n.as_f64() != Some(0.0),
        Value::Null => false,
        _ => true,
    }
}

/// Apply an inclusion or exclusion projection over top-level fields
pub fn project(document: &Document, projection: &Document) -> OrmResult<Document> {
    let keep_id = projection.get(ID_FIELD).map(is_truthy).unwrap_or(true);
    let fields: Vec<(&String, bool)> = projection
        .iter()
        .filter(|(key, _)| key.as_str() != ID_FIELD)
        .map(|(key, value)| (key, is_truthy(value)))
        .collect();

    let inclusive = fields.iter().any(|(_, include)| *include);
    if inclusive && fields.iter().any(|(_, include)| !*include) {
        return Err(OrmError::Query(
            "Projection cannot mix inclusion and exclusion".to_string(),
        ));
    }

    let mut projected = Document::new();
    if inclusive {
        if keep_id {
            if let Some(id) = document.get(ID_FIELD) {
                projected.insert(ID_FIELD.to_string(), id.clone());
            }
        }
        for (key, _) in &fields {
            if let Some(value) = document.get(key.as_str()) {
                projected.insert((*key).clone(), value.clone());
            }
        }
    } else {
        for (key, value) in document {
            let excluded = fields.iter().any(|(field, _)| *field == key);
            if excluded || (key == ID_FIELD && !keep_id) {
                continue;
            }
            projected.insert(key.clone(), value.clone());
        }
    }

    Ok(projected)
}
