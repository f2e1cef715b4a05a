//! Instructions appended to both the CV analysis and the scoring system prompts.

/// All free text shown to recruiters is written in French, whatever the CV language.
pub const FRENCH_OUTPUT_INSTRUCTION: &str = "\
    Every free-text value you produce (summaries, explanations, analyses, flags) MUST be \
    written in French, even when the CV is written in another language. \
    JSON keys and enumerated values stay exactly as specified.";

/// Guards against protected attributes leaking into assessments.
pub const ANTI_BIAS_INSTRUCTION: &str = "\
    CRITICAL: Never mention or take into account age, gender, origin, nationality, \
    family situation, photo, or any other sensitive personal data. \
    Assess only skills, experience and observable professional behavior.";
