use crate::schema::SchemaRef;
use crate::tokenizer::TokenizerOptions;

/// Configuration for [`StreamingParser`](crate::StreamingParser).
///
/// The three lenient flags are tri-state: `None` defers to `llm_mode`, an
/// explicit `Some` always wins. `llm_mode` additionally relaxes separator
/// handling (missing colons and commas are tolerated) and downgrades syntax
/// errors from fatal to accumulated.
#[derive(Debug, Clone)]
pub struct ParserOptions {
    /// Schema to validate against while streaming. Without one, every input
    /// is valid.
    pub schema: Option<SchemaRef>,

    /// Accept the loosely formed JSON that language models commonly emit.
    /// Turns on every unset lenient flag.
    ///
    /// # Default
    ///
    /// `false`
    pub llm_mode: bool,

    /// Ignore a trailing comma before a closing `}` or `]`.
    pub allow_trailing_commas: Option<bool>,

    /// Accept `{name: 1}` style unquoted object keys.
    pub allow_unquoted_keys: Option<bool>,

    /// Accept `'single quoted'` strings and keys.
    pub allow_single_quotes: Option<bool>,

    /// Container nesting ceiling. Exceeding it is fatal in every mode.
    ///
    /// # Default
    ///
    /// `100`
    pub max_depth: usize,
}

impl Default for ParserOptions {
    fn default() -> Self {
        Self {
            schema: None,
            llm_mode: false,
            allow_trailing_commas: None,
            allow_unquoted_keys: None,
            allow_single_quotes: None,
            max_depth: 100,
        }
    }
}

impl ParserOptions {
    pub(crate) fn lenient(&self) -> bool {
        self.llm_mode
    }

    pub(crate) fn trailing_commas(&self) -> bool {
        self.allow_trailing_commas.unwrap_or(self.llm_mode)
    }

    pub(crate) fn unquoted_keys(&self) -> bool {
        self.allow_unquoted_keys.unwrap_or(self.llm_mode)
    }

    pub(crate) fn single_quotes(&self) -> bool {
        self.allow_single_quotes.unwrap_or(self.llm_mode)
    }

    pub(crate) fn tokenizer_options(&self) -> TokenizerOptions {
        TokenizerOptions {
            lenient: self.lenient(),
            allow_single_quotes: self.single_quotes(),
            allow_unquoted_keys: self.unquoted_keys(),
        }
    }
}
