//! Aggregation pipeline stages for the in-memory backend

use std::collections::HashMap;

use serde_json::Value;

use super::evaluator::{field_equals, get_path, matches, project, sort_documents};
use crate::document::{value_kind, Document};
use crate::error::{OrmError, OrmResult};
use crate::query::SortDirection;

/// Run `pipeline` over `documents`; `collections` backs `$lookup`
pub fn run(
    mut documents: Vec<Document>,
    pipeline: &[Document],
    collections: &HashMap<String, Vec<Document>>,
) -> OrmResult<Vec<Document>> {
    for stage in pipeline {
        let (name, spec) = single_entry(stage)?;
        documents = match name {
            "$match" => {
                let filter = object_spec(name, spec)?;
                let mut kept = Vec::with_capacity(documents.len());
                for document in documents {
                    if matches(&document, filter)? {
                        kept.push(document);
                    }
                }
                kept
            }
            "$sort" => {
                let keys = sort_keys(object_spec(name, spec)?)?;
                sort_documents(&mut documents, &keys);
                documents
            }
            "$skip" => {
                let skip = count_spec(name, spec)?;
                documents.into_iter().skip(skip).collect()
            }
            "$limit" => {
                let limit = count_spec(name, spec)?;
                if limit == 0 {
                    return Err(OrmError::Query("$limit must be positive".to_string()));
                }
                documents.truncate(limit);
                documents
            }
            "$project" => {
                let projection = object_spec(name, spec)?;
                documents
                    .iter()
                    .map(|document| project(document, projection))
                    .collect::<OrmResult<Vec<_>>>()?
            }
            "$lookup" => lookup(documents, object_spec(name, spec)?, collections)?,
            "$count" => {
                let field = spec
                    .as_str()
                    .filter(|field| !field.is_empty() && !field.starts_with('$'))
                    .ok_or_else(|| OrmError::Query("$count needs a non-empty field name".to_string()))?;
                if documents.is_empty() {
                    Vec::new()
                } else {
                    let mut counted = Document::new();
                    counted.insert(field.to_string(), Value::from(documents.len() as u64));
                    vec![counted]
                }
            }
            other => {
                return Err(OrmError::Query(format!("Unrecognized pipeline stage name: '{}'", other)))
            }
        };
    }

    Ok(documents)
}

fn single_entry(stage: &Document) -> OrmResult<(&str, &Value)> {
    let mut entries = stage.iter();
    match (entries.next(), entries.next()) {
        (Some((name, spec)), None) => Ok((name.as_str(), spec)),
        _ => Err(OrmError::Query(
            "A pipeline stage specification object must contain exactly one field".to_string(),
        )),
    }
}

fn object_spec<'a>(name: &str, spec: &'a Value) -> OrmResult<&'a Document> {
    spec.as_object()
        .ok_or_else(|| OrmError::Query(format!("{} needs an object, got {}", name, value_kind(spec))))
}

fn count_spec(name: &str, spec: &Value) -> OrmResult<usize> {
    spec.as_u64()
        .map(|count| count as usize)
        .ok_or_else(|| OrmError::Query(format!("{} needs a non-negative integer", name)))
}

fn sort_keys(spec: &Document) -> OrmResult<Vec<(String, SortDirection)>> {
    if spec.is_empty() {
        return Err(OrmError::Query("$sort needs at least one key".to_string()));
    }

    spec.iter()
        .map(|(field, direction)| {
            let direction = match direction.as_i64() {
                Some(1) => SortDirection::Asc,
                Some(-1) => SortDirection::Desc,
                _ => {
                    return Err(OrmError::Query(format!(
                        "$sort key ordering for '{}' must be 1 or -1",
                        field
                    )))
                }
            };
            Ok((field.clone(), direction))
        })
        .collect()
}

fn string_field<'a>(spec: &'a Document, key: &str) -> OrmResult<&'a str> {
    spec.get(key)
        .and_then(Value::as_str)
        .ok_or_else(|| OrmError::Query(format!("$lookup needs a string '{}'", key)))
}

fn lookup(
    documents: Vec<Document>,
    spec: &Document,
    collections: &HashMap<String, Vec<Document>>,
) -> OrmResult<Vec<Document>> {
    let from = string_field(spec, "from")?;
    let local_field = string_field(spec, "localField")?;
    let foreign_field = string_field(spec, "foreignField")?;
    let as_field = string_field(spec, "as")?;

    let foreign = collections.get(from).map(Vec::as_slice).unwrap_or_default();

    Ok(documents
        .into_iter()
        .map(|mut document| {
            let local = get_path(&document, local_field).cloned().unwrap_or(Value::Null);
            let candidates = match &local {
                Value::Array(items) => items.clone(),
                other => vec![other.clone()],
            };

            let joined: Vec<Value> = foreign
                .iter()
                .filter(|other| {
                    let value = get_path(other, foreign_field);
                    candidates.iter().any(|candidate| field_equals(value, candidate))
                })
                .map(|other| Value::Object(other.clone()))
                .collect();

            document.insert(as_field.to_string(), Value::Array(joined));
            document
        })
        .collect())
}
