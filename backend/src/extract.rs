use crate::error::InventoryError;
use axum::extract::FromRequest;

/// `axum::Json`, except a body that fails to parse is answered with the
/// usual `{"success": false, "error": ...}` envelope.
#[derive(FromRequest)]
#[from_request(via(axum::Json), rejection(InventoryError))]
pub struct JsonBody<T>(pub T);
