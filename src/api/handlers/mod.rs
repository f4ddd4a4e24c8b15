// HTTP handlers, one module per resource

pub mod health;
pub mod project;
pub mod store_state;
pub mod teams;
pub mod workflow;
