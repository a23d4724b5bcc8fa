//! System prompt templates for the agent.

use chrono::{SecondsFormat, Utc};

/// Default system prompt; `{system_time}` is filled in on every model call.
pub const SYSTEM_PROMPT: &str = r#"You are a helpful AI assistant.

System time: {system_time}"#;

/// Substitute `system_time` into the prompt template.
pub fn build_system_prompt(template: &str, system_time: &str) -> String {
    template.replace("{system_time}", system_time)
}

/// Current UTC time in ISO 8601 form.
pub fn system_time() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Micros, false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fills_every_time_placeholder() {
        let prompt = build_system_prompt("now={system_time}; again {system_time}", "T");
        assert_eq!(prompt, "now=T; again T");
    }

    #[test]
    fn system_time_is_utc_iso8601() {
        let now = system_time();
        assert!(now.ends_with("+00:00"));
        assert!(chrono::DateTime::parse_from_rfc3339(&now).is_ok());
    }
}
