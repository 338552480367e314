//! Verdict type and extraction from free-form model text.
//!
//! Models are asked for bare JSON but routinely wrap it in a markdown
//! fence. [`extract_payload`] is the single place that knows about that
//! heuristic; [`parse_verdict`] then validates the payload strictly.

use serde::{Deserialize, Serialize};

use crate::error::JudgeError;

#[cfg(feature = "typescript")]
use ts_rs::TS;

/// Binary outcome of a judging call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "typescript", derive(TS))]
#[cfg_attr(feature = "typescript", ts(export))]
#[serde(rename_all = "UPPERCASE")]
pub enum VerdictKind {
    Pass,
    Fail,
}

/// A judge's decision on one submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "typescript", derive(TS))]
#[cfg_attr(feature = "typescript", ts(export))]
pub struct Verdict {
    /// PASS or FAIL
    pub verdict: VerdictKind,
    /// Short reasons, in the order the judge gave them
    pub reasons: Vec<String>,
    /// One actionable tip
    pub hint: String,
}

impl Verdict {
    /// Whether the submission passed.
    pub fn is_pass(&self) -> bool {
        self.verdict == VerdictKind::Pass
    }
}

/// Strip a surrounding code fence from model output.
///
/// Removes one leading fence (optionally tagged `json`, any case) and one
/// trailing fence, then trims whitespace. Text without fences is returned
/// trimmed.
pub fn extract_payload(text: &str) -> &str {
    let mut body = text.trim();

    if let Some(rest) = body.strip_prefix("```") {
        body = match rest.get(..4) {
            Some(tag) if tag.eq_ignore_ascii_case("json") => &rest[4..],
            _ => rest,
        };
    }

    if let Some(rest) = body.trim_end().strip_suffix("```") {
        body = rest;
    }

    body.trim()
}

/// Wire shape before validation; every field optional so missing ones
/// produce a precise error instead of a generic serde message.
#[derive(Deserialize)]
struct RawVerdict {
    verdict: Option<String>,
    reasons: Option<Vec<String>>,
    hint: Option<String>,
}

/// Parse model output into a [`Verdict`].
///
/// Never fabricates a verdict: anything that is not a JSON object with a
/// PASS/FAIL `verdict`, a non-empty `reasons` list and a `hint` is a
/// [`JudgeError::Parse`].
pub fn parse_verdict(text: &str) -> Result<Verdict, JudgeError> {
    let payload = extract_payload(text);

    let raw: RawVerdict =
        serde_json::from_str(payload).map_err(|e| JudgeError::Parse(e.to_string()))?;

    let verdict = match raw.verdict.as_deref() {
        Some("PASS") => VerdictKind::Pass,
        Some("FAIL") => VerdictKind::Fail,
        Some(other) => {
            return Err(JudgeError::Parse(format!("unknown verdict {:?}", other)));
        }
        None => return Err(JudgeError::Parse("missing field `verdict`".to_string())),
    };

    let reasons = raw
        .reasons
        .ok_or_else(|| JudgeError::Parse("missing field `reasons`".to_string()))?;
    if reasons.is_empty() {
        return Err(JudgeError::Parse("`reasons` is empty".to_string()));
    }

    let hint = raw
        .hint
        .ok_or_else(|| JudgeError::Parse("missing field `hint`".to_string()))?;

    Ok(Verdict {
        verdict,
        reasons,
        hint,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const PASSING: &str = r#"{"verdict":"PASS","reasons":["ok"],"hint":"ship it"}"#;

    #[test]
    fn test_json_fence_is_stripped() {
        let text = format!("```json\n{}\n```", PASSING);
        let verdict = parse_verdict(&text).unwrap();

        assert_eq!(
            verdict,
            Verdict {
                verdict: VerdictKind::Pass,
                reasons: vec!["ok".to_string()],
                hint: "ship it".to_string(),
            }
        );
    }

    #[test]
    fn test_extract_payload_variants() {
        assert_eq!(extract_payload(PASSING), PASSING);
        assert_eq!(extract_payload(&format!("```\n{}```", PASSING)), PASSING);
        assert_eq!(extract_payload(&format!("```JSON {}\n```\n", PASSING)), PASSING);
        assert_eq!(extract_payload("  \n```json\n{}\n```  "), "{}");
    }

    #[test]
    fn test_invalid_payload_is_parse_error() {
        for text in [
            "I think this is a PASS!",
            "```json\nnot json\n```",
            "",
            r#"["PASS"]"#,
        ] {
            assert!(
                matches!(parse_verdict(text), Err(JudgeError::Parse(_))),
                "expected parse error for {:?}",
                text
            );
        }
    }

    #[test]
    fn test_missing_or_bad_fields_rejected() {
        let cases = [
            r#"{"reasons":["a"],"hint":"h"}"#,
            r#"{"verdict":"PASS","hint":"h"}"#,
            r#"{"verdict":"PASS","reasons":["a"]}"#,
            r#"{"verdict":"PASS","reasons":[],"hint":"h"}"#,
            r#"{"verdict":"PASS or FAIL","reasons":["a"],"hint":"h"}"#,
            r#"{"verdict":"pass","reasons":["a"],"hint":"h"}"#,
        ];

        for case in cases {
            assert!(parse_verdict(case).is_err(), "accepted {}", case);
        }
    }

    #[test]
    fn test_extra_fields_ignored() {
        let verdict = parse_verdict(
            r#"{"verdict":"FAIL","reasons":["vague","broad"],"hint":"narrow it","score":3}"#,
        )
        .unwrap();

        assert!(!verdict.is_pass());
        assert_eq!(verdict.reasons.len(), 2);
    }

    #[test]
    fn test_wire_shape() {
        let verdict = parse_verdict(PASSING).unwrap();
        assert_eq!(serde_json::to_string(&verdict).unwrap(), PASSING);
    }
}
