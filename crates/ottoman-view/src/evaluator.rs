use std::marker::PhantomData;

use ottoman_vm::{Runtime, RuntimeConfig};

use crate::document::IntoDocument;
use crate::error::{Phase, ViewError};
use crate::group::group;
use crate::map::evaluate_map;
use crate::model::{Query, View, ViewResult};
use crate::reduce::evaluate_reduce;

/// Evaluates views against documents on demand.
///
/// Holds no state between calls: each call builds fresh runtimes from the
/// config, so one evaluator can be shared across threads.
pub struct Evaluator<R: Runtime> {
    config: RuntimeConfig,
    runtime: PhantomData<fn() -> R>,
}

impl<R: Runtime> Evaluator<R> {
    pub fn new(config: RuntimeConfig) -> Self {
        Self {
            config,
            runtime: PhantomData,
        }
    }

    pub fn config(&self) -> &RuntimeConfig {
        &self.config
    }

    /// Map every document, then reduce if the view has a reduce source.
    pub fn evaluate<I>(
        &self,
        view: &View,
        query: &Query,
        documents: I,
    ) -> Result<ViewResult, ViewError>
    where
        I: IntoIterator,
        I::Item: IntoDocument,
    {
        let rows = {
            let runtime = R::create(&self.config).map_err(|e| ViewError::vm(Phase::Map, e))?;
            evaluate_map(&runtime, view, query, documents)?
        };

        match &view.reduce {
            None => Ok(ViewResult::Map(rows)),
            Some(source) => {
                let groups = group(rows, query.group);
                let reduced = evaluate_reduce::<R>(source, &self.config, groups)?;
                Ok(ViewResult::Reduce(reduced))
            }
        }
    }
}

impl<R: Runtime> Default for Evaluator<R> {
    fn default() -> Self {
        Self::new(RuntimeConfig::default())
    }
}

/// Evaluate `view` over `documents` with a default Lua runtime.
#[cfg(feature = "lua")]
pub fn evaluate_view<I>(view: &View, query: &Query, documents: I) -> Result<ViewResult, ViewError>
where
    I: IntoIterator,
    I::Item: IntoDocument,
{
    Evaluator::<ottoman_vm::LuaRuntime>::default().evaluate(view, query, documents)
}
