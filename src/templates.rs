use tera::Tera;

use crate::error::AppError;
use crate::status::StatusReport;

/// Template name for the status page
pub const STATUS_TEMPLATE: &str = "status.html";

/// Initialize the Tera template engine.
///
/// Templates are compiled into the binary so the server has no runtime file
/// dependencies. Names end in `.html`, which turns on Tera's autoescaping for
/// every interpolated value.
pub fn init_templates() -> Result<Tera, AppError> {
    let mut tera = Tera::default();
    tera.add_raw_templates(vec![
        ("base.html", include_str!("../templates/base.html")),
        (STATUS_TEMPLATE, include_str!("../templates/status.html")),
    ])?;

    Ok(tera)
}

/// Render the status page for a finished report.
pub fn render_status_page(tera: &Tera, report: &StatusReport) -> Result<String, AppError> {
    let mut context = tera::Context::new();
    context.insert("report", report);

    Ok(tera.render(STATUS_TEMPLATE, &context)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::facts::AmbientFacts;
    use crate::probe::ConnectionResult;

    fn facts() -> AmbientFacts {
        AmbientFacts {
            server_software: "stack-status 0.1.0".to_string(),
            runtime_version: "rustc 1.85.0".to_string(),
            os_release: "Linux 6.1.0".to_string(),
        }
    }

    fn render(database: ConnectionResult) -> String {
        let tera = init_templates().unwrap();
        render_status_page(&tera, &StatusReport::new(database, facts(), 3)).unwrap()
    }

    #[test]
    fn test_connected_page() {
        let html = render(ConnectionResult::Connected {
            version: "10.11.6-MariaDB".to_string(),
        });

        assert!(html.starts_with("<!DOCTYPE html>"));
        assert!(html.contains("Connected"));
        assert!(html.contains("MariaDB 10.11.6-MariaDB"));
        assert!(!html.contains("Connection error"));
        assert!(!html.contains("status-item failed"));
    }

    #[test]
    fn test_failed_page() {
        let html = render(ConnectionResult::Failed {
            error: "Access denied for user 'appuser'@'10.0.0.2'".to_string(),
        });

        assert!(html.contains("Connection error"));
        assert!(html.contains("Access denied for user &#x27;appuser&#x27;@&#x27;10.0.0.2&#x27;"));
        assert!(!html.contains("MariaDB 10."));
        assert!(html.contains("status-item failed"));
    }

    #[test]
    fn test_ambient_facts_rendered() {
        let html = render(ConnectionResult::Connected {
            version: "10.11.6-MariaDB".to_string(),
        });

        assert!(html.contains("stack-status 0.1.0 running"));
        assert!(html.contains("rustc 1.85.0"));
        assert!(html.contains("System: Linux 6.1.0"));
        assert!(html.contains("in 3 ms"));
    }

    #[test]
    fn test_error_text_is_escaped() {
        let html = render(ConnectionResult::Failed {
            error: "<script>alert(\"x\")</script> & more".to_string(),
        });

        assert!(!html.contains("<script>"));
        assert!(html.contains("&lt;script&gt;"));
        assert!(html.contains("&quot;x&quot;"));
        assert!(html.contains("&amp; more"));
    }

    #[test]
    fn test_version_text_is_escaped() {
        let html = render(ConnectionResult::Connected {
            version: "<b>10.11</b>&\"".to_string(),
        });

        assert!(!html.contains("<b>10.11"));
        assert!(html.contains("&lt;b&gt;10.11"));
        assert!(html.contains("&amp;&quot;"));
    }
}
