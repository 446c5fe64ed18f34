//! Decoding of backend error bodies.
//!
//! The backend answers failures with a Spring-style JSON body:
//! `{"status": 422, "error": "...", "message": "...", "errors": [{"field", "message"}]}`.
//! Every key is optional; bodies that are not JSON still produce an error
//! carrying the HTTP status.

use catalog_core::error::UNPROCESSABLE_ENTITY;
use catalog_core::{ApiError, FieldViolation};
use serde::Deserialize;

#[derive(Debug, Default, Deserialize)]
struct ErrorBody {
    status: Option<u16>,
    error: Option<String>,
    message: Option<String>,
    #[serde(default)]
    errors: Vec<FieldViolation>,
}

pub fn decode_error(http_status: u16, body: &str) -> ApiError {
    let parsed: ErrorBody = serde_json::from_str(body).unwrap_or_default();
    let status = parsed.status.unwrap_or(http_status);

    if status == UNPROCESSABLE_ENTITY && !parsed.errors.is_empty() {
        return ApiError::Validation {
            status,
            message: parsed.message,
            errors: parsed.errors,
        };
    }

    ApiError::Status {
        status,
        message: parsed.message,
        error: parsed.error,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_field_errors_body() {
        let body = r#"{
            "timestamp": "2025-10-01T12:00:00Z",
            "status": 422,
            "error": "Dados inválidos",
            "message": "Erro de validação",
            "path": "/produtos",
            "errors": [
                {"field": "categoria.id", "message": "Categoria é obrigatória"},
                {"field": "lojas", "message": "Informe ao menos uma loja"}
            ]
        }"#;
        let ApiError::Validation { status, message, errors } = decode_error(422, body) else {
            panic!("expected validation error");
        };
        assert_eq!(status, 422);
        assert_eq!(message.as_deref(), Some("Erro de validação"));
        assert_eq!(errors.len(), 2);
        assert_eq!(errors[0].field, "categoria.id");
    }

    #[test]
    fn test_422_without_field_list_is_generic() {
        let e = decode_error(422, r#"{"status": 422, "message": "Regra de negócio"}"#);
        assert!(matches!(e, ApiError::Status { status: 422, .. }));
        assert_eq!(e.server_message(), Some("Regra de negócio"));
    }

    #[test]
    fn test_not_found_body() {
        let e = decode_error(404, r#"{"status": 404, "error": "Recurso não encontrado"}"#);
        assert_eq!(
            e,
            ApiError::Status {
                status: 404,
                message: None,
                error: Some("Recurso não encontrado".to_string()),
            }
        );
    }

    #[test]
    fn test_non_json_body_keeps_http_status() {
        let e = decode_error(502, "<html>Bad Gateway</html>");
        assert_eq!(
            e,
            ApiError::Status {
                status: 502,
                message: None,
                error: None,
            }
        );
    }
}
