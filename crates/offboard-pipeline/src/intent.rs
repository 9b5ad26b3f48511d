use std::sync::{Arc, OnceLock};

use offboard_ai::{ChatRequest, LlmClient};
use regex::Regex;
use serde_json::{Map, Value};

pub const EMAIL_NOT_FOUND: &str = "not found";
pub const DEFAULT_SYSTEM: &str = "jira";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// Enumerates supported `IntentAction` values.
pub enum IntentAction {
    Deactivate,
    Ignore,
    Unknown,
}

impl IntentAction {
    pub fn parse(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "deactivate" => Self::Deactivate,
            "ignore" => Self::Ignore,
            _ => Self::Unknown,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Deactivate => "deactivate",
            Self::Ignore => "ignore",
            Self::Unknown => "unknown",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// Structured reading of one ticket.
pub struct ExtractedIntent {
    pub action: IntentAction,
    pub email: String,
    pub systems: Vec<String>,
}

impl ExtractedIntent {
    pub fn is_deactivation(&self) -> bool {
        self.action == IntentAction::Deactivate
    }

    /// Builds an intent from a model-produced JSON object.
    pub fn from_json_object(object: &Map<String, Value>) -> Self {
        let action = object
            .get("action")
            .and_then(Value::as_str)
            .map(IntentAction::parse)
            .unwrap_or(IntentAction::Ignore);
        let email = object
            .get("email")
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|email| !email.is_empty())
            .unwrap_or(EMAIL_NOT_FOUND)
            .to_string();
        let systems = object
            .get("systems")
            .and_then(Value::as_array)
            .map(|systems| normalize_systems(systems.iter().filter_map(Value::as_str)))
            .unwrap_or_default();

        Self {
            action,
            email,
            systems: default_systems_if_empty(systems),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
/// When the regex heuristic stands in for the model.
pub enum ExtractionFallback {
    /// Whenever the model path yields nothing usable.
    #[default]
    OnFailure,
    /// Only when no model is configured.
    WithoutLlm,
    Disabled,
}

/// Lower-cases, trims and de-duplicates system identifiers, keeping the
/// order of first appearance.
pub fn normalize_systems<'a>(raw: impl IntoIterator<Item = &'a str>) -> Vec<String> {
    let mut systems: Vec<String> = Vec::new();
    for system in raw {
        let normalized = system.trim().to_ascii_lowercase();
        if normalized.is_empty() || systems.contains(&normalized) {
            continue;
        }
        systems.push(normalized);
    }
    systems
}

fn default_systems_if_empty(systems: Vec<String>) -> Vec<String> {
    if systems.is_empty() {
        vec![DEFAULT_SYSTEM.to_string()]
    } else {
        systems
    }
}

fn email_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"[A-Za-z0-9._%+\-]+@[A-Za-z0-9.\-]+\.[A-Za-z]{2,}")
            .expect("email regex compiles")
    })
}

/// First email address in `text`, if any.
pub fn find_email(text: &str) -> Option<&str> {
    email_regex().find(text).map(|found| found.as_str())
}

/// Deterministic reading used without a usable model answer. Only an email
/// actually present in the text can produce a deactivation.
pub fn heuristic_intent(text: &str) -> ExtractedIntent {
    match find_email(text) {
        Some(email) => ExtractedIntent {
            action: IntentAction::Deactivate,
            email: email.to_string(),
            systems: vec![DEFAULT_SYSTEM.to_string()],
        },
        None => ExtractedIntent {
            action: IntentAction::Ignore,
            email: EMAIL_NOT_FOUND.to_string(),
            systems: vec![DEFAULT_SYSTEM.to_string()],
        },
    }
}

pub fn build_extraction_prompt(text: &str) -> String {
    format!(
        r#"Analyze this Jira ticket and determine if it is a deactivation request.

Text:
{text}

If it is a deactivation request, return ONLY valid JSON:

{{
  "action": "deactivate",
  "email": "user@example.com",
  "systems": ["jira", "confluence", "azure_devops"]
}}

If it is NOT a deactivation request, return:

{{
  "action": "ignore"
}}
"#
    )
}

/// Best-effort recovery of one JSON object from free-form model output.
///
/// The greedy slice from the first `{` to the last `}` is tried first; when it
/// does not parse, each balanced `{...}` span is tried in order.
pub fn parse_model_json(raw: &str) -> Option<Map<String, Value>> {
    let start = raw.find('{')?;
    let end = raw.rfind('}')?;
    if end > start {
        if let Ok(Value::Object(object)) = serde_json::from_str::<Value>(&raw[start..=end]) {
            return Some(object);
        }
    }

    raw.char_indices()
        .filter(|(_, ch)| *ch == '{')
        .filter_map(|(index, _)| balanced_object_end(raw, index).map(|end| &raw[index..end]))
        .find_map(|candidate| match serde_json::from_str::<Value>(candidate) {
            Ok(Value::Object(object)) => Some(object),
            _ => None,
        })
}

/// Byte index just past the `}` closing the object opened at `start`.
fn balanced_object_end(raw: &str, start: usize) -> Option<usize> {
    let mut depth = 0_usize;
    let mut in_string = false;
    let mut escaped = false;
    for (offset, ch) in raw[start..].char_indices() {
        if in_string {
            if escaped {
                escaped = false;
            } else if ch == '\\' {
                escaped = true;
            } else if ch == '"' {
                in_string = false;
            }
            continue;
        }
        match ch {
            '"' => in_string = true,
            '{' => depth += 1,
            '}' => {
                depth = depth.checked_sub(1)?;
                if depth == 0 {
                    return Some(start + offset + ch.len_utf8());
                }
            }
            _ => {}
        }
    }
    None
}

#[derive(Clone)]
/// Turns ticket text into an [`ExtractedIntent`].
pub struct IntentExtractor {
    llm: Option<Arc<dyn LlmClient>>,
    model: String,
    fallback: ExtractionFallback,
}

impl IntentExtractor {
    pub fn new(
        llm: Option<Arc<dyn LlmClient>>,
        model: impl Into<String>,
        fallback: ExtractionFallback,
    ) -> Self {
        Self {
            llm,
            model: model.into(),
            fallback,
        }
    }

    pub fn llm_configured(&self) -> bool {
        self.llm.is_some()
    }

    /// `None` means the intent could not be determined; it is never an error.
    pub async fn extract(&self, text: &str) -> Option<ExtractedIntent> {
        if let Some(llm) = self.llm.as_ref() {
            if let Some(intent) = self.extract_with_llm(llm.as_ref(), text).await {
                return Some(intent);
            }
        } else {
            tracing::info!("no language model configured");
        }

        let use_fallback = match self.fallback {
            ExtractionFallback::OnFailure => true,
            ExtractionFallback::WithoutLlm => self.llm.is_none(),
            ExtractionFallback::Disabled => false,
        };
        if !use_fallback {
            return None;
        }

        let intent = heuristic_intent(text);
        tracing::info!(
            action = intent.action.as_str(),
            email_found = intent.email != EMAIL_NOT_FOUND,
            "heuristic intent extraction applied"
        );
        Some(intent)
    }

    async fn extract_with_llm(&self, llm: &dyn LlmClient, text: &str) -> Option<ExtractedIntent> {
        let mut request =
            ChatRequest::single_prompt(self.model.as_str(), build_extraction_prompt(text));
        request.json_mode = true;
        request.temperature = Some(0.0);

        let response = match llm.complete(request).await {
            Ok(response) => response,
            Err(error) => {
                tracing::warn!(error = %error, "intent extraction model call failed");
                return None;
            }
        };

        let raw = response.message.text_content();
        tracing::debug!(raw_response = raw, "intent extraction model response");
        let Some(object) = parse_model_json(raw) else {
            tracing::warn!("intent extraction response contained no JSON object");
            return None;
        };

        let intent = ExtractedIntent::from_json_object(&object);
        if intent.is_deactivation()
            && intent.email != EMAIL_NOT_FOUND
            && !text
                .to_ascii_lowercase()
                .contains(&intent.email.to_ascii_lowercase())
        {
            tracing::warn!(
                email = intent.email.as_str(),
                "model returned an email that does not appear in the ticket text"
            );
        }
        Some(intent)
    }
}
