pub(crate) mod admin_handlers;
pub(crate) mod payment_handlers;
pub(crate) mod portal_handlers;
pub(crate) mod webhook_handlers;
