#![warn(clippy::all, clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod components;
pub mod geom;
pub mod value;

use std::fmt;

use components::{ComponentError, ComponentRegistry, ConfigurationError, OutputMap};
use value::Value;
use wasm_bindgen::JsError;
use wasm_bindgen::prelude::*;

cfg_if::cfg_if! {
    if #[cfg(all(feature = "console_error_panic_hook", target_arch = "wasm32"))] {
        #[wasm_bindgen(start)]
        pub fn initialize() {
            console_error_panic_hook::set_once();
            init_logger();
        }
    } else {
        #[wasm_bindgen(start)]
        pub fn initialize() {
            init_logger();
        }
    }
}

#[cfg(feature = "debug_logs")]
fn init_logger() {
    use log::LevelFilter;
    use wasm_bindgen_console_logger::DEFAULT_LOGGER;
    // Een tweede initialisatie laat de bestaande logger staan.
    if log::set_logger(&DEFAULT_LOGGER).is_ok() {
        log::set_max_level(LevelFilter::Debug);
    }
}

#[cfg(not(feature = "debug_logs"))]
fn init_logger() {}

#[cfg(all(feature = "parallel", target_arch = "wasm32"))]
#[wasm_bindgen]
pub async fn initialize_parallel(worker_count: Option<u32>) -> Result<(), JsError> {
    let threads = worker_count
        .map(|count| count.max(1) as usize)
        .or_else(|| {
            std::thread::available_parallelism()
                .map(|value| value.get())
                .ok()
        })
        .unwrap_or(1);

    wasm_bindgen_rayon::init_thread_pool(threads)
        .await
        .map_err(|err| JsError::new(&format!("kon rayon threadpool niet initialiseren: {err:?}")))
}

/// Alle fouten die via de [`Engine`] naar de host kunnen lekken.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error(transparent)]
    Configuration(#[from] ConfigurationError),
    #[error("{component}: {source}")]
    Component {
        component: &'static str,
        #[source]
        source: ComponentError,
    },
    #[error("ongeldige waarde vanuit JavaScript: {0}")]
    Serialization(#[from] serde_wasm_bindgen::Error),
}

/// Public entry point for consumers.
#[wasm_bindgen]
pub struct Engine {
    registry: ComponentRegistry,
}

impl Default for Engine {
    fn default() -> Self {
        Self::new()
    }
}

#[wasm_bindgen]
impl Engine {
    #[wasm_bindgen(constructor)]
    #[must_use]
    pub fn new() -> Engine {
        Engine {
            registry: ComponentRegistry::with_default_components(),
        }
    }

    /// Alle namen en aliassen waarop een component gevonden kan worden.
    #[wasm_bindgen]
    pub fn component_names(&self) -> Vec<String> {
        self.registry.names()
    }

    /// Koppel een extra naam aan een bestaand component.
    #[wasm_bindgen]
    pub fn register_alias(&mut self, alias: &str, target: &str) -> Result<(), JsValue> {
        self.registry
            .register_alias(alias, target)
            .map_err(to_js_error)
    }

    /// Evalueer één component op naam of GUID met een lijst van getagde
    /// waarden (`{ "type": "Point", "value": [x, y, z] }`).
    #[wasm_bindgen]
    pub fn evaluate(&self, name: &str, inputs: JsValue) -> Result<JsValue, JsValue> {
        let inputs: Vec<Value> = serde_wasm_bindgen::from_value(inputs)
            .map_err(EngineError::from)
            .map_err(to_js_error)?;
        let outputs = self.evaluate_values(name, &inputs).map_err(to_js_error)?;
        serde_wasm_bindgen::to_value(&outputs).map_err(|err| JsError::new(&err.to_string()).into())
    }
}

impl Engine {
    /// Engine met een zelf opgebouwde registry.
    #[must_use]
    pub fn with_registry(registry: ComponentRegistry) -> Self {
        Self { registry }
    }

    /// Native variant van [`Engine::evaluate`].
    pub fn evaluate_values(&self, name: &str, inputs: &[Value]) -> Result<OutputMap, EngineError> {
        let kind = self.registry.require(name)?;
        log::debug!(
            "engine: evalueer {} met {} invoer(en)",
            kind.name(),
            inputs.len()
        );
        kind.evaluate(inputs)
            .map_err(|source| EngineError::Component {
                component: kind.name(),
                source,
            })
    }
}

fn to_js_error<E: fmt::Display>(error: E) -> JsValue {
    js_error(&error.to_string())
}

fn js_error(message: &str) -> JsValue {
    #[cfg(target_arch = "wasm32")]
    {
        JsError::new(message).into()
    }
    #[cfg(not(target_arch = "wasm32"))]
    {
        let _ = message;
        JsValue::NULL
    }
}

#[cfg(test)]
mod tests {
    use super::{Engine, EngineError};
    use crate::components::ComponentRegistry;
    use crate::value::Value;

    #[test]
    fn evaluates_by_name_and_guid() {
        let engine = Engine::new();
        let by_name = engine
            .evaluate_values("XY Plane", &[Value::Point([1.0, 2.0, 3.0])])
            .expect("component slaagt");
        let by_guid = engine
            .evaluate_values(
                "{17b7152b-d30d-4d50-b9ef-c9fe25576fc2}",
                &[Value::Point([1.0, 2.0, 3.0])],
            )
            .expect("component slaagt");
        assert_eq!(by_name, by_guid);
    }

    #[test]
    fn component_errors_name_the_component() {
        let engine = Engine::new();
        let err = engine.evaluate_values("Field Line", &[]).unwrap_err();
        assert!(matches!(err, EngineError::Component { component: "Field Line", .. }));
        assert_eq!(err.to_string(), "Field Line: Field Line vereist een veld");
    }

    #[test]
    fn unknown_components_are_configuration_errors() {
        let engine = Engine::with_registry(ComponentRegistry::new());
        let err = engine.evaluate_values("XY Plane", &[]).unwrap_err();
        assert!(matches!(err, EngineError::Configuration(_)));
        assert!(engine.component_names().is_empty());
    }
}
