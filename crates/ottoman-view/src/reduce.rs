use ottoman_vm::{HostError, Runtime, RuntimeConfig};
use serde_json::Value;

use crate::error::{Phase, ReduceError, ViewError};
use crate::group::Group;
use crate::model::ReducedRow;
use crate::reducers::{BuiltinReducer, HELPERS, Helper};

const REDUCE_PARAMS: &[&str] = &["key", "values", "rereduce"];

enum Reducer<R: Runtime> {
    Builtin(BuiltinReducer),
    Script { runtime: R, function: R::Function },
}

/// A bare `_name` that is not a known built-in.
fn is_unknown_builtin(source: &str) -> bool {
    source.starts_with('_') && source.chars().all(|c| c == '_' || c.is_ascii_alphanumeric())
}

fn register_helper<R: Runtime>(
    runtime: &R,
    name: &'static str,
    helper: Helper,
) -> Result<(), ViewError> {
    runtime
        .register(name, move |args| {
            let values = match args.first() {
                Some(Value::Array(values)) => values.as_slice(),
                // an empty script table arrives as an empty object
                Some(Value::Object(map)) if map.is_empty() => &[],
                _ => return Err(HostError(ReduceError::NotAnArray(name).to_string())),
            };
            helper(values).map_err(|e| HostError(format!("{name}: {e}")))
        })
        .map_err(|e| ViewError::vm(Phase::Reduce, e))
}

impl<R: Runtime> Reducer<R> {
    fn prepare(source: &str, config: &RuntimeConfig) -> Result<Self, ViewError> {
        let source = source.trim();
        if let Some(builtin) = BuiltinReducer::from_name(source) {
            return Ok(Self::Builtin(builtin));
        }
        if is_unknown_builtin(source) {
            return Err(ViewError::compilation(
                Phase::Reduce,
                format!("unknown built-in reducer {source}"),
            ));
        }

        let runtime = R::create(config).map_err(|e| ViewError::vm(Phase::Reduce, e))?;
        for &(name, helper) in HELPERS {
            register_helper(&runtime, name, helper)?;
        }
        let function = runtime
            .compile("reduce", source, REDUCE_PARAMS)
            .map_err(|e| ViewError::vm(Phase::Reduce, e))?;
        Ok(Self::Script { runtime, function })
    }

    fn reduce(&self, key: &Value, values: Vec<Value>) -> Result<Value, ViewError> {
        match self {
            Self::Builtin(builtin) => builtin.reduce(&values).map_err(|e| {
                ViewError::execution(Phase::Reduce, format!("{}: {e}", builtin.name()))
            }),
            Self::Script { runtime, function } => runtime
                .call(
                    function,
                    &[key.clone(), Value::Array(values), Value::Bool(false)],
                )
                .map_err(|e| ViewError::execution(Phase::Reduce, format!("key {key}: {e}"))),
        }
    }
}

/// Reduce each group to one row, in group order.
pub(crate) fn evaluate_reduce<R: Runtime>(
    source: &str,
    config: &RuntimeConfig,
    groups: Vec<Group>,
) -> Result<Vec<ReducedRow>, ViewError> {
    let reducer = Reducer::<R>::prepare(source, config)?;
    if let Reducer::Builtin(builtin) = &reducer {
        tracing::debug!(reducer = builtin.name(), "using built-in reducer");
    }

    let mut rows = Vec::with_capacity(groups.len());
    for Group { key, values } in groups {
        let value = reducer.reduce(&key, values)?;
        rows.push(ReducedRow { key, value });
    }
    tracing::debug!(rows = rows.len(), "reduce phase complete");
    Ok(rows)
}
