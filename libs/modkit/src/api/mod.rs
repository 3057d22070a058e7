//! HTTP API building blocks: operation builder, problem details, JSON body helpers.

pub mod context;
pub mod json;
pub mod operation_builder;
pub mod problem;

pub use context::RequestCtx;
pub use operation_builder::{
    ensure_schema, state, Missing, OpenApiRegistry, OperationBuilder, OperationSpec,
    ParamLocation, ParamSpec, Present, RequestBodySpec, ResponseSpec, SchemaCollection,
};
