//! Response Interpreter — turns a free-text model reply into an `AnalysisResult`.
//!
//! The reply is scanned line by line with a small state machine:
//!
//! ```text
//! SCANNING --label--> CAPTURING(field) --label--> CAPTURING(other) ... --eof--> DONE
//! ```
//!
//! A capture runs until the next recognized label or end of input. A field that
//! is restated is overwritten (last write wins). When no label is recognized at
//! all, a JSON object in the reply is tried instead.
//!
//! Nothing here returns an error for a malformed reply: every unusable field is
//! replaced by its documented default and the result is flagged `degraded`.

use std::collections::{BTreeMap, HashSet};

use regex::{Captures, Regex};
use serde_json::Value;
use tracing::debug;

use crate::analysis::lexicon::{Field, Lexicon, LexiconError};
use crate::analysis::result::{
    AnalysisResult, FactualAccuracy, Prediction, SourceQuality, DEFAULT_CONFIDENCE,
};

/// Default upper bound on the number of red flags kept.
pub const DEFAULT_MAX_RED_FLAGS: usize = 10;

/// Leading decoration allowed before a line label: whitespace, markdown
/// headings/emphasis/quotes, bullets and enumerators.
const LINE_PREFIX: &str = r"^[\s#>*•\-]*(?:\d+[.)]\s*)?[\s*_]*";
/// Between a label and its colon (closing emphasis), and after the colon.
const LABEL_TAIL: &str = r"[\s*_]*:[\s*_]*";

type Captured = BTreeMap<Field, Vec<String>>;

/// Stateless after construction; share it behind an `Arc`.
#[derive(Debug, Clone)]
pub struct ResponseInterpreter {
    line_label: Regex,
    inline_label: Regex,
    /// Capture group `l{i}` belongs to `label_fields[i]`.
    label_fields: Vec<Field>,
    /// `(label key, field)` for JSON replies, e.g. `("source_quality", SourceQuality)`.
    json_keys: Vec<(String, Field)>,
    /// Tokenized verdict phrases, longest first.
    verdicts: Vec<(Vec<String>, Prediction)>,
    no_flag_phrases: HashSet<String>,
    confidence_number: Regex,
    max_red_flags: usize,
}

#[derive(Clone, Copy)]
enum State {
    Scanning,
    Capturing(Field),
}

impl ResponseInterpreter {
    pub fn new(lexicon: &Lexicon, max_red_flags: usize) -> Result<Self, LexiconError> {
        lexicon.validate()?;

        let mut variants: Vec<(String, Field)> = Field::ALL
            .iter()
            .flat_map(|&field| {
                lexicon
                    .labels
                    .for_field(field)
                    .iter()
                    .filter(|v| !v.trim().is_empty())
                    .map(move |v| (v.trim().to_string(), field))
            })
            .collect();
        // Longest first so "CONFIDENCE LEVEL" wins over "CONFIDENCE".
        variants.sort_by(|a, b| b.0.len().cmp(&a.0.len()));

        let alternation = variants
            .iter()
            .enumerate()
            .map(|(i, (variant, _))| format!("(?P<l{i}>{})", label_pattern(variant)))
            .collect::<Vec<_>>()
            .join("|");

        let line_label = Regex::new(&format!("(?i){LINE_PREFIX}(?:{alternation}){LABEL_TAIL}"))?;
        let inline_label = Regex::new(&format!(r"(?i)\b(?:{alternation}){LABEL_TAIL}"))?;

        let json_keys = variants
            .iter()
            .map(|(variant, field)| (json_key(variant), *field))
            .collect();
        let label_fields = variants.into_iter().map(|(_, field)| field).collect();

        let mut verdicts: Vec<(Vec<String>, Prediction)> = lexicon
            .fake_phrases
            .iter()
            .map(|p| (words(p), Prediction::Fake))
            .chain(lexicon.real_phrases.iter().map(|p| (words(p), Prediction::Real)))
            .filter(|(tokens, _)| !tokens.is_empty())
            .collect();
        verdicts.sort_by(|a, b| b.0.len().cmp(&a.0.len()));

        let no_flag_phrases = lexicon
            .no_flag_phrases
            .iter()
            .map(|p| clean_item(p).to_uppercase())
            .filter(|p| !p.is_empty())
            .collect();

        Ok(Self {
            line_label,
            inline_label,
            label_fields,
            json_keys,
            verdicts,
            no_flag_phrases,
            confidence_number: Regex::new(
                r"(?i)(-?(?:\d+(?:\.\d+)?|\.\d+))\s*(?:(%|percent)|/\s*(\d+(?:\.\d+)?))?",
            )?,
            max_red_flags: max_red_flags.max(1),
        })
    }

    /// Parses `reply` into a fully-populated result. Never fails.
    pub fn interpret(&self, reply: &str) -> AnalysisResult {
        let mut captured = self.scan(reply);
        if captured.is_empty() {
            if let Some(from_json) = self.scan_json(reply) {
                captured = from_json;
            }
        }
        self.finish(&captured)
    }

    /// SCANNING / CAPTURING pass over the reply lines.
    fn scan(&self, reply: &str) -> Captured {
        let mut captured = Captured::new();
        let mut state = State::Scanning;

        for line in reply.lines() {
            let label = self
                .line_label
                .captures(line)
                .and_then(|caps| self.matched_label(&caps))
                .filter(|&(_, field)| !is_red_flag_item(state, field, line, &captured));

            if let Some((whole, field)) = label {
                for (field, value) in self.split_inline(field, &line[whole..]) {
                    // Restated field: the later occurrence replaces the earlier one.
                    captured.insert(field, vec![value.trim().to_string()]);
                    state = State::Capturing(field);
                }
            } else if let State::Capturing(field) = state {
                if let Some(lines) = captured.get_mut(&field) {
                    lines.push(line.trim_end().to_string());
                }
            }
        }

        captured
    }

    /// Returns the end offset of the whole label match and the field it names.
    fn matched_label(&self, caps: &Captures<'_>) -> Option<(usize, Field)> {
        let end = caps.get(0)?.end();
        let field = self
            .label_fields
            .iter()
            .enumerate()
            .find(|(i, _)| caps.name(&format!("l{i}")).is_some())
            .map(|(_, field)| *field)?;
        Some((end, field))
    }

    /// Splits a labeled line like `CONFIDENCE: 90% SOURCE QUALITY: Poor` into
    /// per-field values. Reasoning swallows the rest of the line.
    fn split_inline<'a>(&self, first: Field, rest: &'a str) -> Vec<(Field, &'a str)> {
        let mut segments = Vec::new();
        let mut current = first;
        let mut value_start = 0;

        while current != Field::Reasoning {
            let Some(caps) = self.inline_label.captures_at(rest, value_start) else {
                break;
            };
            let Some(whole) = caps.get(0) else {
                break;
            };
            let Some((_, next)) = self.matched_label(&caps) else {
                break;
            };
            segments.push((current, &rest[value_start..whole.start()]));
            current = next;
            value_start = whole.end();
        }

        segments.push((current, &rest[value_start..]));
        segments
    }

    /// Fallback for replies shaped as a JSON object instead of labeled lines.
    fn scan_json(&self, reply: &str) -> Option<Captured> {
        let body = strip_json_fences(reply);
        let start = body.find('{')?;
        let end = body.rfind('}')?;
        if end <= start {
            return None;
        }
        let Value::Object(map) = serde_json::from_str::<Value>(&body[start..=end]).ok()? else {
            return None;
        };

        let mut captured = Captured::new();
        for (key, value) in &map {
            let key = json_key(key);
            if key == "is_fake" {
                if let Value::Bool(is_fake) = value {
                    let verdict = if *is_fake { Prediction::Fake } else { Prediction::Real };
                    captured.insert(Field::Prediction, vec![verdict.as_str().to_string()]);
                }
                continue;
            }
            let Some(field) = self
                .json_keys
                .iter()
                .find(|(k, _)| *k == key)
                .map(|(_, field)| *field)
            else {
                continue;
            };
            let lines: Vec<String> = match value {
                Value::String(s) => s.lines().map(str::to_string).collect(),
                Value::Number(n) => vec![n.to_string()],
                Value::Bool(b) => vec![b.to_string()],
                // Array items become bullets so commas inside an item are kept.
                // `[]` stays an empty capture: an explicit "nothing to report".
                Value::Array(items) => {
                    let bullets: Vec<String> = items
                        .iter()
                        .filter_map(Value::as_str)
                        .map(|s| format!("- {s}"))
                        .collect();
                    if bullets.is_empty() && !items.is_empty() {
                        continue;
                    }
                    bullets
                }
                _ => continue,
            };
            captured.insert(field, lines);
        }

        (!captured.is_empty()).then_some(captured)
    }

    /// DONE: normalizes every field and substitutes defaults for anything unusable.
    fn finish(&self, captured: &Captured) -> AnalysisResult {
        let mut defaulted: Vec<Field> = Vec::new();
        let lines = |field: Field| captured.get(&field).map(Vec::as_slice);

        let prediction = lines(Field::Prediction)
            .and_then(first_non_empty)
            .and_then(|value| self.resolve_prediction(value));
        let low_confidence_parse = prediction.is_none();
        if low_confidence_parse {
            defaulted.push(Field::Prediction);
        }

        let confidence = lines(Field::Confidence)
            .and_then(first_non_empty)
            .and_then(|value| self.parse_confidence(value));
        let confidence = match (low_confidence_parse, confidence) {
            (false, Some(confidence)) => confidence,
            (true, _) => DEFAULT_CONFIDENCE,
            (false, None) => {
                defaulted.push(Field::Confidence);
                DEFAULT_CONFIDENCE
            }
        };

        let source_quality = lines(Field::SourceQuality)
            .and_then(first_non_empty)
            .and_then(|value| resolve_tier(value, SourceQuality::from_label))
            .unwrap_or_else(|| {
                defaulted.push(Field::SourceQuality);
                SourceQuality::default()
            });

        let factual_accuracy = lines(Field::FactualAccuracy)
            .and_then(first_non_empty)
            .and_then(|value| resolve_tier(value, FactualAccuracy::from_label))
            .unwrap_or_else(|| {
                defaulted.push(Field::FactualAccuracy);
                FactualAccuracy::default()
            });

        let red_flags = match lines(Field::RedFlags) {
            Some(captured) => self.parse_red_flags(captured).unwrap_or_else(|| {
                defaulted.push(Field::RedFlags);
                Vec::new()
            }),
            None => {
                defaulted.push(Field::RedFlags);
                Vec::new()
            }
        };

        let reasoning = lines(Field::Reasoning)
            .map(|captured| captured.join("\n").trim().to_string())
            .unwrap_or_default();
        if reasoning.is_empty() {
            defaulted.push(Field::Reasoning);
        }

        let degraded = !defaulted.is_empty();
        if degraded {
            debug!(?defaulted, low_confidence_parse, "Model reply parsed with defaults");
        }

        AnalysisResult::new(
            prediction.unwrap_or_default(),
            confidence,
            source_quality,
            factual_accuracy,
            red_flags,
            reasoning,
            degraded,
            low_confidence_parse,
        )
    }

    /// Earliest verdict phrase in the value wins; at one position the longest phrase wins.
    fn resolve_prediction(&self, value: &str) -> Option<Prediction> {
        let tokens = words(value);
        (0..tokens.len()).find_map(|pos| {
            self.verdicts
                .iter()
                .find(|(phrase, _)| tokens[pos..].starts_with(phrase))
                .map(|(_, verdict)| *verdict)
        })
    }

    /// `99%` → 0.99, `0.85` / `.85` → 0.85, bare `85` → 0.85, `8/10` → 0.8.
    /// Clamping happens on construction.
    fn parse_confidence(&self, value: &str) -> Option<f64> {
        let caps = self.confidence_number.captures(value)?;
        let number: f64 = caps.get(1)?.as_str().parse().ok()?;
        if let Some(denominator) = caps.get(3) {
            let denominator: f64 = denominator.as_str().parse().ok()?;
            return (denominator > 0.0).then(|| number / denominator);
        }
        if caps.get(2).is_some() || number > 1.0 {
            Some(number / 100.0)
        } else {
            Some(number)
        }
    }

    /// `None` when the capture holds no usable phrase at all. A capture with no
    /// lines comes from an empty JSON array and means no flags.
    fn parse_red_flags(&self, captured: &[String]) -> Option<Vec<String>> {
        if captured.is_empty() {
            return Some(Vec::new());
        }
        let mut items: Vec<String> = Vec::new();
        for line in captured {
            let (bulleted, body) = strip_bullet(line);
            if bulleted {
                items.push(clean_item(body).to_string());
            } else {
                items.extend(body.split([',', ';']).map(|s| clean_item(s).to_string()));
            }
        }
        items.retain(|item| !item.is_empty());

        if items.is_empty() {
            return None;
        }

        let mut seen = HashSet::new();
        let flags = items
            .into_iter()
            .filter(|item| !self.no_flag_phrases.contains(&item.to_uppercase()))
            .filter(|item| seen.insert(item.to_lowercase()))
            .take(self.max_red_flags)
            .collect();
        Some(flags)
    }
}

/// Inside a red-flags block, a bullet such as `- Source credibility: weak` is a
/// flag, not a restated label. Bullets may still open a field not yet seen.
fn is_red_flag_item(state: State, field: Field, line: &str, captured: &Captured) -> bool {
    matches!(state, State::Capturing(Field::RedFlags))
        && strip_bullet(line).0
        && captured.contains_key(&field)
}

/// Regex source for one label variant; words may be joined by space, `_` or `-`.
fn label_pattern(variant: &str) -> String {
    variant
        .split(|c: char| c.is_whitespace() || c == '_' || c == '-')
        .filter(|w| !w.is_empty())
        .map(regex::escape)
        .collect::<Vec<_>>()
        .join(r"[\s_\-]+")
}

/// `"Source Quality"` / `"source-quality"` → `"source_quality"`.
fn json_key(label: &str) -> String {
    label
        .split(|c: char| c.is_whitespace() || c == '_' || c == '-')
        .filter(|w| !w.is_empty())
        .map(str::to_lowercase)
        .collect::<Vec<_>>()
        .join("_")
}

/// Upper-cased alphanumeric words.
fn words(text: &str) -> Vec<String> {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty())
        .map(str::to_uppercase)
        .collect()
}

fn first_non_empty(lines: &[String]) -> Option<&str> {
    lines.iter().map(|l| l.trim()).find(|l| !l.is_empty())
}

/// Exact tier name first, then the leading word (`"Poor - no sources"` → Poor).
fn resolve_tier<T>(value: &str, from_label: fn(&str) -> Option<T>) -> Option<T> {
    let cleaned = clean_item(value);
    from_label(cleaned).or_else(|| {
        cleaned
            .split(|c: char| !c.is_alphabetic())
            .find(|w| !w.is_empty())
            .and_then(from_label)
    })
}

/// Strips a leading `-`, `*`, `•` or `1.` / `1)` marker.
fn strip_bullet(line: &str) -> (bool, &str) {
    let trimmed = line.trim_start();
    if let Some(rest) = trimmed
        .strip_prefix("- ")
        .or_else(|| trimmed.strip_prefix("* "))
        .or_else(|| trimmed.strip_prefix('•'))
    {
        return (true, rest);
    }
    let digits = trimmed.chars().take_while(|c| c.is_ascii_digit()).count();
    if digits > 0 {
        let after = &trimmed[digits..];
        if let Some(rest) = after.strip_prefix(". ").or_else(|| after.strip_prefix(") ")) {
            return (true, rest);
        }
    }
    (false, trimmed)
}

/// Trims whitespace, surrounding emphasis/quotes and trailing punctuation.
fn clean_item(item: &str) -> &str {
    item.trim()
        .trim_matches(|c: char| matches!(c, '*' | '_' | '"' | '\'' | '`' | '-' | '•'))
        .trim_end_matches(['.', ',', ';', '!'])
        .trim()
}

/// Strips ```json ... ``` or ``` ... ``` code fences from LLM output.
fn strip_json_fences(text: &str) -> &str {
    let text = text.trim();
    if let Some(stripped) = text.strip_prefix("```json") {
        stripped
            .trim_start()
            .strip_suffix("```")
            .map(|s| s.trim())
            .unwrap_or(stripped.trim_start())
    } else if let Some(stripped) = text.strip_prefix("```") {
        stripped
            .trim_start()
            .strip_suffix("```")
            .map(|s| s.trim())
            .unwrap_or(stripped.trim_start())
    } else {
        text
    }
}
