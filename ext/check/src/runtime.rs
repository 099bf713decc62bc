//! Deterministic runtime for test cases.

use routa::{RequestAttributes, RuntimeGate, RuntimeSource};

/// Enables a gate only when its key is the request's active runtime key and
/// the gate's default fraction admits the request's random value.
///
/// Every other gate is off, so a test case can reach at most one
/// runtime-gated route. An empty active key enables nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct ActiveKeyRuntime;

impl RuntimeSource for ActiveKeyRuntime {
    fn feature_enabled(&self, gate: &RuntimeGate, request: &RequestAttributes) -> bool {
        request.active_runtime_key().filter(|key| !key.is_empty()) == Some(gate.key())
            && gate.default_value().evaluate(request.random_value())
    }
}
