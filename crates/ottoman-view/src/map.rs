use std::cell::RefCell;
use std::rc::Rc;

use ottoman_vm::{Runtime, VmError};
use serde_json::Value;

use crate::document::IntoDocument;
use crate::error::{Phase, ViewError};
use crate::key::keys_equal;
use crate::model::{EmittedRow, Query, View};

const EMIT: &str = "emit";
const MAP_PARAMS: &[&str] = &["doc"];

/// Run the map function once per document, in order.
///
/// The map function's return value is ignored. Emissions are buffered per
/// call and stamped with the document's `_id` afterwards; rows whose key does
/// not equal `query.key` are dropped.
pub(crate) fn evaluate_map<R, I>(
    runtime: &R,
    view: &View,
    query: &Query,
    documents: I,
) -> Result<Vec<EmittedRow>, ViewError>
where
    R: Runtime,
    I: IntoIterator,
    I::Item: IntoDocument,
{
    let emitted: Rc<RefCell<Vec<(Value, Value)>>> = Rc::default();
    let sink = Rc::clone(&emitted);
    runtime
        .register(EMIT, move |args| {
            let mut args = args.into_iter();
            let key = args.next().unwrap_or(Value::Null);
            let value = args.next().unwrap_or(Value::Null);
            sink.borrow_mut().push((key, value));
            Ok(Value::Null)
        })
        .map_err(|e| ViewError::vm(Phase::Map, e))?;

    let map = runtime
        .compile("map", &view.map, MAP_PARAMS)
        .map_err(|e| ViewError::vm(Phase::Map, e))?;

    let mut rows = Vec::new();
    let mut mapped = 0usize;
    for (index, doc) in documents.into_iter().enumerate() {
        let doc = doc
            .into_document()
            .map_err(|e| ViewError::MalformedDocument {
                index,
                message: e.to_string(),
            })?;
        runtime
            .exec(&map, std::slice::from_ref(doc.as_value()))
            .map_err(|e| match e {
                VmError::Conversion(message) => {
                    ViewError::MalformedDocument { index, message }
                }
                other => ViewError::execution(
                    Phase::Map,
                    format!("document {index} ({}): {other}", doc.id()),
                ),
            })?;

        let id = doc.id();
        for (key, value) in emitted.borrow_mut().drain(..) {
            if query.key.as_ref().is_none_or(|want| keys_equal(want, &key)) {
                rows.push(EmittedRow {
                    id: id.clone(),
                    key,
                    value,
                });
            }
        }
        mapped += 1;
    }

    tracing::debug!(documents = mapped, rows = rows.len(), "map phase complete");
    Ok(rows)
}
