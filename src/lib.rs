#![doc = "The `taskgate` library crate."]
#![doc = ""]
#![doc = "A task-tracking API where an authorization policy sits between every"]
#![doc = "handler and the store: administrators create and assign tasks, assignees"]
#![doc = "update status and comment. The policy module holds the pure decision"]
#![doc = "functions; handlers resolve the actor and the target, ask the policy,"]
#![doc = "and only then touch the store."]

pub mod auth;
pub mod config;
pub mod error;
pub mod models;
pub mod policy;
pub mod routes;
pub mod state;
pub mod store;
