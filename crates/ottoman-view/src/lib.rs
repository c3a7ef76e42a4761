//! On-the-fly map/reduce view evaluation over JSON documents.
//!
//! ```ignore
//! let view = View::new("emit(doc.category, 1)").with_reduce("_sum");
//! let rows = evaluate_view(&view, &Query::new().with_group(true), docs)?;
//! ```

mod document;
mod error;
mod evaluator;
mod group;
mod key;
mod map;
mod model;
mod reduce;
pub mod reducers;

pub use document::{Document, IntoDocument};
pub use error::{DocumentError, Phase, ReduceError, ViewError};
#[cfg(feature = "lua")]
pub use evaluator::evaluate_view;
pub use evaluator::Evaluator;
pub use key::keys_equal;
pub use model::{DesignDocument, EmittedRow, Query, ReducedRow, View, ViewResult};
pub use ottoman_vm::{LibSet, RuntimeConfig};
#[cfg(feature = "lua")]
pub use ottoman_vm::LuaRuntime;
