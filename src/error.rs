use thiserror::Error;

#[derive(Debug, Error)]
pub enum PlannerError {
    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("Config error: {0}")]
    Config(String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("TOML parse error: {0}")]
    TomlDe(#[from] toml::de::Error),
}

pub type Result<T> = std::result::Result<T, PlannerError>;

/// Structured error data for the message channel
#[derive(Debug, Clone, PartialEq)]
pub enum ErrorInfo {
    Api { status: u16, body: String },
    Network(String),
}

impl ErrorInfo {
    pub fn from_planner_error(e: &PlannerError) -> Self {
        match e {
            PlannerError::Api { status, message } => ErrorInfo::Api {
                status: *status,
                body: message.clone(),
            },
            _ => ErrorInfo::Network(e.to_string()),
        }
    }
}

/// Ready-to-render error popup data. Only load failures reach the user; write
/// failures are logged.
#[derive(Debug, Clone, PartialEq)]
pub struct ErrorPopup {
    pub title: String,
    pub message: String,
    pub hint: String,
}

impl ErrorPopup {
    pub fn from_error_info(info: &ErrorInfo) -> Self {
        match info {
            ErrorInfo::Api { status, body } => Self::from_api(*status, body),
            ErrorInfo::Network(msg) => Self {
                title: "Network Error".into(),
                message: truncate(msg, 80),
                hint: "Check that the planner backend is reachable".into(),
            },
        }
    }

    fn from_api(status: u16, body: &str) -> Self {
        let extracted_message = extract_json_message(body);

        match status {
            401 => Self {
                title: "Unauthorized".into(),
                message: "Invalid API token".into(),
                hint: "Check backend.api_token in config.toml".into(),
            },
            404 => Self {
                title: "Not Found".into(),
                message: extracted_message.unwrap_or_else(|| "No plan for this day".into()),
                hint: "Check backend.url in config.toml".into(),
            },
            429 => Self {
                title: "Rate Limited".into(),
                message: extracted_message.unwrap_or_else(|| "Too many requests".into()),
                hint: "Wait a moment and press Ctrl+r".into(),
            },
            500..=599 => Self {
                title: "Server Error".into(),
                message: extracted_message.unwrap_or_else(|| "The backend returned an error".into()),
                hint: "Try again later".into(),
            },
            _ => Self {
                title: format!("API Error ({})", status),
                message: extracted_message.unwrap_or_else(|| truncate(body, 200)),
                hint: "Try again later".into(),
            },
        }
    }
}

fn extract_json_message(body: &str) -> Option<String> {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|v| v.get("message")?.as_str().map(String::from))
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let truncated: String = s.chars().take(max).collect();
        format!("{}...", truncated)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn api_error_displays_status_and_message() {
        let err = PlannerError::Api {
            status: 401,
            message: "Unauthorized".into(),
        };
        assert_eq!(err.to_string(), "API error (401): Unauthorized");
    }

    #[test]
    fn config_error_displays_message() {
        let err = PlannerError::Config("backend.url is required".into());
        assert_eq!(err.to_string(), "Config error: backend.url is required");
    }

    #[test]
    fn io_error_converts_from_std() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: PlannerError = io_err.into();
        assert!(matches!(err, PlannerError::Io(_)));
        assert!(err.to_string().contains("file not found"));
    }

    #[test]
    fn toml_error_converts_from_toml_de() {
        let toml_err = toml::from_str::<toml::Value>("= invalid").unwrap_err();
        let err: PlannerError = toml_err.into();
        assert!(matches!(err, PlannerError::TomlDe(_)));
    }

    #[test]
    fn error_popup_from_401() {
        let popup = ErrorPopup::from_error_info(&ErrorInfo::Api {
            status: 401,
            body: String::new(),
        });
        assert_eq!(popup.title, "Unauthorized");
        assert!(popup.hint.contains("api_token"));
    }

    #[test]
    fn error_popup_from_5xx_extracts_message() {
        let popup = ErrorPopup::from_error_info(&ErrorInfo::Api {
            status: 503,
            body: r#"{"message":"maintenance window"}"#.into(),
        });
        assert_eq!(popup.title, "Server Error");
        assert_eq!(popup.message, "maintenance window");
    }

    #[test]
    fn error_popup_unknown_status_falls_back_to_body() {
        let popup = ErrorPopup::from_error_info(&ErrorInfo::Api {
            status: 418,
            body: "teapot".into(),
        });
        assert_eq!(popup.title, "API Error (418)");
        assert_eq!(popup.message, "teapot");
    }

    #[test]
    fn error_popup_truncates_long_network_message() {
        let popup = ErrorPopup::from_error_info(&ErrorInfo::Network("a".repeat(100)));
        assert_eq!(popup.title, "Network Error");
        assert!(popup.message.ends_with("..."));
        assert_eq!(popup.message.chars().count(), 83);
    }

    #[test]
    fn error_info_from_non_api_error_is_network() {
        let info = ErrorInfo::from_planner_error(&PlannerError::Config("bad".into()));
        assert!(matches!(info, ErrorInfo::Network(_)));
    }
}
