//! Display metadata for each level.

use gauntlet_judge::Level;
use serde::Serialize;

/// What the player sees for a level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LevelInfo {
    pub level: Level,
    /// Persona shown on the level card and in reports
    pub persona: &'static str,
    pub persona_detail: &'static str,
    /// Full task prompt
    pub task: &'static str,
    /// Short heading used in reports
    pub task_label: &'static str,
    pub placeholder: &'static str,
    pub paywalled: bool,
}

const CATALOG: [LevelInfo; 5] = [
    LevelInfo {
        level: Level::ProblemStatement,
        persona: "The Skeptic",
        persona_detail: "Reddit Skeptic",
        task: "Write a 3-sentence problem statement describing the problem your idea solves.",
        task_label: "Problem Statement",
        placeholder: "People who [target audience] struggle with [specific problem] because [root cause]. \
This leads to [painful consequence]. Existing solutions fail because [gap].",
        paywalled: false,
    },
    LevelInfo {
        level: Level::ValueProposition,
        persona: "The Devil's Advocate",
        persona_detail: "Devil's Advocate",
        task: "Write your value proposition: who it's for, what it does, why it's different.",
        task_label: "Value Proposition",
        placeholder: "For [target customer] who [need/want], [product name] is a [category] that \
[key benefit]. Unlike [alternatives], we [differentiator].",
        paywalled: false,
    },
    LevelInfo {
        level: Level::HeroSection,
        persona: "The Cold Visitor",
        persona_detail: "Cold Traffic",
        task: "Write your hero section: headline + subtitle + CTA text.",
        task_label: "Hero Section",
        placeholder: "Headline: [bold claim]\nSubtitle: [one sentence explanation]\nCTA: [action button text]",
        paywalled: true,
    },
    LevelInfo {
        level: Level::PricingModel,
        persona: "The Investor",
        persona_detail: "Angel Investor",
        task: "Describe your pricing model and business case.",
        task_label: "Pricing Model",
        placeholder: "We charge [price] per [unit/month] for [customer type]. Unit economics: \
CAC ~$[X], LTV ~$[Y]. Moat: [why competitors can't copy us easily].",
        paywalled: true,
    },
    LevelInfo {
        level: Level::CrisisResponse,
        persona: "The Crisis",
        persona_detail: "Crisis Scenario",
        task: "Write a public response to this tweet: \"@[YourApp] just lost 3 hours of my work \
because of a bug. This is unacceptable. I want a refund.\"",
        task_label: "Crisis Response",
        placeholder: "Write your actual tweet/response here...",
        paywalled: true,
    },
];

/// Metadata for a level.
pub fn info(level: Level) -> &'static LevelInfo {
    &CATALOG[usize::from(level.ordinal()) - 1]
}

/// All levels in play order.
pub fn all() -> &'static [LevelInfo] {
    &CATALOG
}
