// Adapters layer: concrete implementations for external systems (intranet http, xlsx output).

pub mod session;
pub mod sheet;
