//! Judge persona prompts.
//!
//! Each level is judged by a persona with a narrow lens and a binary
//! PASS/FAIL rule. Every prompt ends with the same reply contract so the
//! verdict extractor can treat all personas alike.

use crate::error::JudgeError;
use crate::level::Level;

/// Reply contract appended to every persona.
const REPLY_SHAPE: &str = r#"Respond ONLY with valid JSON (no markdown, no prose before or after): {"verdict":"PASS or FAIL","reasons":["reason1","reason2"],"hint":"one actionable tip"}"#;

const SKEPTIC: &str = "You are a cynical Reddit user who has seen thousands of startup ideas fail. \
You will receive someone's startup problem statement. Evaluate if this is a REAL, specific, \
painful problem that real people actually have. If it's vague, too broad, or sounds like \
wishful thinking, FAIL them. If it's specific and credible, PASS.";

const DEVILS_ADVOCATE: &str = "You are a brutally honest friend with startup experience \
evaluating a value proposition. Find fatal flaws: Could Amazon/Google do this tomorrow? \
Does it already exist? Is differentiation real or fluff? FAIL if you find a fatal flaw. \
PASS only if differentiation is genuine and defensible.";

const COLD_VISITOR: &str = "You are a random person who clicked a link on Twitter and landed \
on a startup homepage. You have 5 seconds of patience. Read the hero section they wrote. \
Do you understand what this does in 5 seconds? Would you click the CTA? If the headline is \
clever but confusing, FAIL. If the CTA is vague, FAIL. If you get it immediately and want to \
know more, PASS.";

const INVESTOR: &str = "You are a sharp angel investor evaluating a startup's pricing model \
and business case. Probe for: Who actually pays this price? What are the unit economics? \
Is there a moat? FAIL if no clear path to profitability or pricing makes no sense. \
PASS if coherent and defensible.";

const CRISIS: &str = "You are evaluating a startup founder's crisis communication. A customer \
publicly tweeted: \"[ProductName] just lost 3 hours of my work because of a bug. This is \
unacceptable. I want a refund.\" Evaluate their written response: Is it empathetic? Does it \
take responsibility without being defensive? Is it professional? Would this calm the customer \
or go viral for wrong reasons? FAIL if defensive, dismissive, or bad PR. PASS if genuinely \
good crisis communication.";

/// Static registry mapping levels to persona instructions.
pub struct PersonaRegistry;

impl PersonaRegistry {
    /// The persona body (without the reply contract) for a level.
    pub fn persona(level: Level) -> &'static str {
        match level {
            Level::ProblemStatement => SKEPTIC,
            Level::ValueProposition => DEVILS_ADVOCATE,
            Level::HeroSection => COLD_VISITOR,
            Level::PricingModel => INVESTOR,
            Level::CrisisResponse => CRISIS,
        }
    }

    /// Full system instruction for a level.
    pub fn system_prompt(level: Level) -> String {
        format!("{} {}", Self::persona(level), REPLY_SHAPE)
    }

    /// Resolve a raw ordinal from a client request to its level and
    /// system instruction.
    pub fn lookup(ordinal: i64) -> Result<(Level, String), JudgeError> {
        Level::from_ordinal(ordinal)
            .map(|level| (level, Self::system_prompt(level)))
            .ok_or_else(|| JudgeError::InvalidRequest("Invalid level".to_string()))
    }
}
