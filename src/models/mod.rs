pub mod package;
pub mod payment;
pub mod transaction;
pub mod webhook;
