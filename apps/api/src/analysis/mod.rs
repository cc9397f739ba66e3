// Analysis core: prompt construction and reply interpretation.
// Pure, synchronous and I/O-free. The LLM call itself lives in llm_client.

pub mod builder;
pub mod interpreter;
pub mod lexicon;
pub mod prompts;
pub mod result;

pub use builder::{InvalidInputError, Prompt, RequestBuilder, DEFAULT_MAX_INPUT_CHARS};
pub use interpreter::{ResponseInterpreter, DEFAULT_MAX_RED_FLAGS};
pub use lexicon::{Field, Lexicon, LexiconError};
pub use result::{AnalysisResult, FactualAccuracy, Prediction, SourceQuality};
