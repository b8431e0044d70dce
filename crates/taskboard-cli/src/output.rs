use serde::Serialize;
use taskboard_core::{TaskboardError, ValidationErrors};

#[derive(Serialize)]
pub struct CliResponse<'a, T: Serialize> {
    pub success: bool,
    pub api_version: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kind: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fields: Option<&'a ValidationErrors>,
}

fn encode<T: Serialize>(response: &CliResponse<'_, T>) -> String {
    serde_json::to_string(response).unwrap_or_else(|e| {
        format!(r#"{{"success":false,"error":"failed to encode response: {e}"}}"#)
    })
}

pub fn output_success<T: Serialize>(data: T) {
    let response = CliResponse {
        success: true,
        api_version: env!("CARGO_PKG_VERSION"),
        data: Some(data),
        error: None,
        kind: None,
        fields: None,
    };
    println!("{}", encode(&response));
}

/// Prints the error envelope to stderr and exits with code 1.
pub fn output_error(error: &anyhow::Error) -> ! {
    let taskboard_error = error.downcast_ref::<TaskboardError>();
    let fields = match taskboard_error {
        Some(TaskboardError::Validation(errors)) => Some(errors),
        _ => None,
    };
    let response: CliResponse<'_, ()> = CliResponse {
        success: false,
        api_version: env!("CARGO_PKG_VERSION"),
        data: None,
        error: Some(error.to_string()),
        kind: taskboard_error.map(TaskboardError::kind),
        fields,
    };
    eprintln!("{}", encode(&response));
    std::process::exit(1);
}
