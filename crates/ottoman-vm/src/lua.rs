use mlua::{Function, Lua, LuaOptions, LuaSerdeExt, MultiValue, StdLib, Variadic};
use serde_json::Value;

use crate::config::{LibSet, RuntimeConfig};
use crate::error::VmError;
use crate::runtime::{HostResult, Runtime};

/// Global holding the JSON `null` sentinel.
const NULL_GLOBAL: &str = "null";

/// A [`Runtime`] on an embedded Lua 5.4 state.
///
/// Sources are accepted as a function expression (`function(doc) ... end`),
/// a single expression used as the return value, or a statement block used
/// as the function body.
pub struct LuaRuntime {
    lua: Lua,
}

impl LuaRuntime {
    fn libs(set: LibSet) -> StdLib {
        match set {
            LibSet::Safe => StdLib::ALL_SAFE,
            LibSet::Minimal => StdLib::STRING | StdLib::TABLE | StdLib::MATH,
        }
    }

    fn args(&self, args: &[Value]) -> Result<MultiValue, VmError> {
        args.iter()
            .map(|arg| self.lua.to_value(arg))
            .collect::<mlua::Result<MultiValue>>()
            .map_err(|e| VmError::Conversion(e.to_string()))
    }
}

/// True when `source` is an anonymous function expression.
fn is_function_expr(source: &str) -> bool {
    source
        .strip_prefix("function")
        .is_some_and(|rest| rest.starts_with(|c: char| c == '(' || c.is_whitespace()))
}

impl Runtime for LuaRuntime {
    type Function = Function;

    fn create(config: &RuntimeConfig) -> Result<Self, VmError> {
        let lua = Lua::new_with(Self::libs(config.libs), LuaOptions::default())
            .map_err(|e| VmError::Init(e.to_string()))?;
        let runtime = Self { lua };
        runtime.bind(NULL_GLOBAL, &Value::Null)?;
        Ok(runtime)
    }

    fn compile(
        &self,
        name: &str,
        source: &str,
        params: &[&str],
    ) -> Result<Function, VmError> {
        let source = source.trim();
        let params = params.join(", ");
        let chunks = if is_function_expr(source) {
            vec![format!("return {source}")]
        } else {
            vec![
                format!("return function({params})\nreturn {source}\nend"),
                format!("return function({params})\n{source}\nend"),
            ]
        };

        let mut last_err = None;
        for chunk in chunks {
            match self.lua.load(chunk).set_name(name).into_function() {
                Ok(loader) => {
                    tracing::trace!(name, "compiled script chunk");
                    return loader
                        .call::<Function>(())
                        .map_err(|e| VmError::Compile(format!("{name}: {e}")));
                }
                Err(e) => last_err = Some(e),
            }
        }
        Err(VmError::Compile(match last_err {
            Some(e) => e.to_string(),
            None => format!("{name}: empty source"),
        }))
    }

    fn bind(&self, name: &str, value: &Value) -> Result<(), VmError> {
        let value = self
            .lua
            .to_value(value)
            .map_err(|e| VmError::Conversion(e.to_string()))?;
        self.lua
            .globals()
            .set(name, value)
            .map_err(|e| VmError::Runtime(e.to_string()))
    }

    fn register<F>(&self, name: &str, callback: F) -> Result<(), VmError>
    where
        F: Fn(Vec<Value>) -> HostResult + 'static,
    {
        let function = self
            .lua
            .create_function(move |lua, args: Variadic<mlua::Value>| {
                let args = args
                    .into_iter()
                    .map(|arg| lua.from_value::<Value>(arg))
                    .collect::<mlua::Result<Vec<_>>>()?;
                match callback(args) {
                    Ok(Value::Null) => Ok(mlua::Value::Nil),
                    Ok(out) => lua.to_value(&out),
                    Err(e) => Err(mlua::Error::runtime(e)),
                }
            })
            .map_err(|e| VmError::Runtime(e.to_string()))?;
        self.lua
            .globals()
            .set(name, function)
            .map_err(|e| VmError::Runtime(e.to_string()))
    }

    fn call(&self, function: &Function, args: &[Value]) -> Result<Value, VmError> {
        let args = self.args(args)?;
        let out = function
            .call::<mlua::Value>(args)
            .map_err(|e| VmError::Runtime(e.to_string()))?;
        self.lua
            .from_value(out)
            .map_err(|e| VmError::Conversion(e.to_string()))
    }

    fn exec(&self, function: &Function, args: &[Value]) -> Result<(), VmError> {
        let args = self.args(args)?;
        function
            .call::<()>(args)
            .map_err(|e| VmError::Runtime(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use serde_json::json;

    use super::*;
    use crate::HostError;

    fn runtime() -> LuaRuntime {
        LuaRuntime::create(&RuntimeConfig::default()).unwrap()
    }

    // ── Compile forms ────────────────────────────────────────

    #[test]
    fn compiles_function_expression() {
        let rt = runtime();
        let f = rt
            .compile("map", "function(doc) return doc.n * 2 end", &["doc"])
            .unwrap();
        assert_eq!(rt.call(&f, &[json!({"n": 21})]).unwrap(), json!(42));
    }

    #[test]
    fn compiles_bare_expression() {
        let rt = runtime();
        let f = rt.compile("reduce", "#values", &["key", "values"]).unwrap();
        assert_eq!(rt.call(&f, &[json!(null), json!([1, 2, 3])]).unwrap(), json!(3));
    }

    #[test]
    fn compiles_statement_block() {
        let rt = runtime();
        let src = "local total = 0\nfor _, v in ipairs(values) do total = total + v end\nreturn total";
        let f = rt.compile("reduce", src, &["key", "values"]).unwrap();
        assert_eq!(rt.call(&f, &[json!("k"), json!([1, 2, 3])]).unwrap(), json!(6));
    }

    #[test]
    fn syntax_error_is_compile_error() {
        let rt = runtime();
        let err = rt.compile("map", "emit(doc.k,", &["doc"]).unwrap_err();
        assert!(matches!(err, VmError::Compile(_)));
    }

    #[test]
    fn named_function_statement_is_rejected() {
        let rt = runtime();
        let err = rt
            .compile("map", "function named(doc) end", &["doc"])
            .unwrap_err();
        assert!(matches!(err, VmError::Compile(_)));
    }

    // ── Calls ────────────────────────────────────────────────

    #[test]
    fn runtime_error_surfaces() {
        let rt = runtime();
        let f = rt.compile("map", "error('boom')", &["doc"]).unwrap();
        let err = rt.call(&f, &[json!({})]).unwrap_err();
        assert!(matches!(err, VmError::Runtime(msg) if msg.contains("boom")));
    }

    #[test]
    fn function_result_is_conversion_error() {
        let rt = runtime();
        let f = rt
            .compile("map", "function() return function() end end", &[])
            .unwrap();
        let err = rt.call(&f, &[]).unwrap_err();
        assert!(matches!(err, VmError::Conversion(_)));
    }

    #[test]
    fn exec_discards_unconvertible_results() {
        let rt = runtime();
        let f = rt
            .compile("map", "function(doc) return string, print end", &["doc"])
            .unwrap();
        assert_eq!(rt.exec(&f, &[json!({})]), Ok(()));
        assert!(matches!(rt.call(&f, &[json!({})]), Err(VmError::Conversion(_))));
    }

    #[test]
    fn exec_reports_runtime_errors() {
        let rt = runtime();
        let f = rt.compile("map", "error('exec boom')", &["doc"]).unwrap();
        let err = rt.exec(&f, &[json!({})]).unwrap_err();
        assert!(matches!(err, VmError::Runtime(msg) if msg.contains("exec boom")));
    }

    #[test]
    fn missing_field_reads_as_nil() {
        let rt = runtime();
        let f = rt.compile("map", "doc.missing == nil", &["doc"]).unwrap();
        assert_eq!(rt.call(&f, &[json!({"a": 1})]).unwrap(), json!(true));
    }

    #[test]
    fn json_null_matches_null_global() {
        let rt = runtime();
        let f = rt.compile("map", "doc.a == null", &["doc"]).unwrap();
        assert_eq!(rt.call(&f, &[json!({"a": null})]).unwrap(), json!(true));
    }

    #[test]
    fn arrays_round_trip_as_sequences() {
        let rt = runtime();
        let f = rt.compile("map", "{doc.tags[2], #doc.tags}", &["doc"]).unwrap();
        assert_eq!(
            rt.call(&f, &[json!({"tags": ["x", "y"]})]).unwrap(),
            json!(["y", 2])
        );
    }

    // ── Host callbacks ───────────────────────────────────────

    #[test]
    fn host_callback_receives_arguments() {
        let rt = runtime();
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        rt.register("emit", move |args| {
            sink.borrow_mut().push(args);
            Ok(Value::Null)
        })
        .unwrap();
        let f = rt
            .compile("map", "emit(doc.k, 1)\nemit(nil, {a = 2})", &["doc"])
            .unwrap();
        rt.call(&f, &[json!({"k": "x"})]).unwrap();
        assert_eq!(
            *seen.borrow(),
            vec![vec![json!("x"), json!(1)], vec![json!(null), json!({"a": 2})]]
        );
    }

    #[test]
    fn host_null_result_is_nil() {
        let rt = runtime();
        rt.register("nothing", |_| Ok(Value::Null)).unwrap();
        let f = rt.compile("map", "nothing() == nil", &[]).unwrap();
        assert_eq!(rt.call(&f, &[]).unwrap(), json!(true));
    }

    #[test]
    fn host_error_unwinds_script() {
        let rt = runtime();
        rt.register("fail", |_| Err(HostError::from("nope"))).unwrap();
        let f = rt.compile("map", "fail()", &[]).unwrap();
        let err = rt.call(&f, &[]).unwrap_err();
        assert!(matches!(err, VmError::Runtime(msg) if msg.contains("nope")));
    }

    #[test]
    fn bind_sets_global() {
        let rt = runtime();
        rt.bind("limit", &json!(5)).unwrap();
        let f = rt.compile("map", "limit + 1", &[]).unwrap();
        assert_eq!(rt.call(&f, &[]).unwrap(), json!(6));
    }

    #[test]
    fn runtimes_do_not_share_globals() {
        let a = runtime();
        let b = runtime();
        a.bind("leak", &json!(1)).unwrap();
        let f = b.compile("map", "leak == nil", &[]).unwrap();
        assert_eq!(b.call(&f, &[]).unwrap(), json!(true));
    }

    #[test]
    fn minimal_libs_omit_os() {
        let rt = LuaRuntime::create(&RuntimeConfig {
            libs: LibSet::Minimal,
        })
        .unwrap();
        let f = rt.compile("map", "os == nil and math ~= nil", &[]).unwrap();
        assert_eq!(rt.call(&f, &[]).unwrap(), json!(true));
    }
}
