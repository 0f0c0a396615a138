pub mod gateway_service;
pub mod generator;
pub mod transaction_store;
pub mod webhook_signature;
