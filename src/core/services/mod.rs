pub mod alias_registry;
pub mod identity_substitutor;
pub mod policy_engine;
pub mod request_mediator;
