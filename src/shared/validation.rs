//! Validation Utilities
//!
//! Bridges `validator` derive output into the API error shape.

use validator::ValidationErrors;

use super::error::AppError;

/// Flatten validation failures into one bad-request message.
///
/// Every failing field is reported, sorted by field name so the
/// message is stable across runs.
pub fn validation_error(errors: ValidationErrors) -> AppError {
    let mut lines: Vec<String> = errors
        .field_errors()
        .iter()
        .map(|(field, failures)| {
            let detail = failures
                .iter()
                .filter_map(|f| f.message.as_deref())
                .collect::<Vec<_>>()
                .join(", ");
            if detail.is_empty() {
                format!("{} is invalid", field)
            } else {
                format!("{}: {}", field, detail)
            }
        })
        .collect();
    lines.sort();

    if lines.is_empty() {
        return AppError::Validation("Validation failed".into());
    }
    AppError::Validation(lines.join("; "))
}

#[cfg(test)]
mod tests {
    use super::*;
    use validator::Validate;

    #[derive(Validate)]
    struct BookingForm {
        #[validate(length(min = 1, message = "Client name is required"))]
        client_name: String,
        #[validate(range(min = 1, message = "At least one service is required"))]
        service_count: u32,
    }

    #[test]
    fn test_reports_every_failing_field_in_stable_order() {
        let errors = BookingForm {
            client_name: String::new(),
            service_count: 0,
        }
        .validate()
        .unwrap_err();

        match validation_error(errors) {
            AppError::Validation(msg) => assert_eq!(
                msg,
                "client_name: Client name is required; \
                 service_count: At least one service is required"
            ),
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_single_failure_names_the_field() {
        let errors = BookingForm {
            client_name: "Ana".into(),
            service_count: 0,
        }
        .validate()
        .unwrap_err();

        match validation_error(errors) {
            AppError::Validation(msg) => {
                assert_eq!(msg, "service_count: At least one service is required")
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }
}
