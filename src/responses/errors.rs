use crate::errors::ServerError;
use crate::templates::components::error_page;
use astra::{Body, Response, ResponseBuilder};

pub type ResultResp = Result<Response, ServerError>;

/// Convert a ServerError into an HTML error page with a matching status.
pub fn error_to_response(err: ServerError) -> Response {
    let status = err.status();
    let (title, message) = match &err {
        ServerError::NotFound => ("Not Found", "That page or record does not exist.".to_string()),
        ServerError::BadRequest(msg) => ("Bad Request", msg.clone()),
        ServerError::DbError(msg) => ("Database Error", msg.clone()),
        ServerError::InternalError => ("Internal Server Error", "Something went wrong.".to_string()),
        ServerError::Export(e) => ("Download Failed", e.user_message().to_string()),
    };

    if status >= 500 {
        log::error!("{status}: {err}");
    }

    let body = error_page(status, title, &message).into_string();

    ResponseBuilder::new()
        .status(status)
        .header("Content-Type", "text/html; charset=utf-8")
        .body(Body::from(body))
        .unwrap_or_else(|_| Response::new(Body::from("Internal Server Error")))
}
