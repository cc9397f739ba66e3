// Prompt constants for news analysis.
//
// The labeled layout below is a contract with `analysis::lexicon::Lexicon::default()`.
// Change both together and bump TEMPLATE_VERSION.

/// Version of the instruction template. Reported with every prompt.
pub const TEMPLATE_VERSION: &str = "2";

/// System instruction sent alongside every analysis prompt.
pub const ANALYSIS_SYSTEM: &str = "You are an expert fact-checker and journalist. \
    You assess news text against journalistic standards and fact-checking principles. \
    You MUST answer using the exact labeled layout you are given. \
    Do NOT use JSON. Do NOT use markdown code fences. \
    Do NOT add any text before the first label.";

/// Analysis prompt template. Replace `{text}` before sending.
pub const ANALYSIS_PROMPT_TEMPLATE: &str = r#"Analyze the following text for signs of fake news or misinformation.

Consider these factors:
1. Source credibility: does it cite reliable, verifiable sources?
2. Language patterns: is the language sensational, inflammatory or overly dramatic?
3. Factual claims: are there verifiable facts or just opinions?
4. Writing quality: is it well written with proper grammar and structure?
5. Emotional manipulation: does it use fear, anger or outrage to persuade?
6. Consistency: are the claims internally consistent?
7. Timeliness: are the claims current and relevant?

Respond with EXACTLY these six labeled lines, in this order:

PREDICTION: <FAKE or REAL>
CONFIDENCE: <a percentage from 0% to 100%>
SOURCE QUALITY: <Poor, Fair, Good or Excellent>
FACTUAL ACCURACY: <Low, Medium or High>
RED FLAGS: <comma-separated short phrases, or None>
REASONING: <a brief explanation of your decision>

Be objective. Judge only the text between the markers.

--- BEGIN TEXT ---
{text}
--- END TEXT ---"#;

/// Appended to an article clipped to the configured maximum length.
pub const TRUNCATION_MARKER: &str = "\n[TRUNCATED: text exceeded the maximum analysis length]";
