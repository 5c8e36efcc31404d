//! Go language definition

use tracing::warn;

use crate::error::SyntaxError;
use crate::syntax::keywords::KeywordTable;
use crate::syntax::language::LanguageDefinition;
use crate::syntax::pattern::{CompileOptions, PatternEngine};
use crate::syntax::rules::{MultilineRule, PatternRule};
use crate::syntax::tokens::TokenType;

/// State ID for `/* ... */`
pub const BLOCK_COMMENT: u8 = 1;
/// State ID for `#if 0` ... `#endif`
pub const DISABLED_CODE: u8 = 2;
/// State ID for backtick raw strings
pub const RAW_STRING: u8 = 3;

const KEYWORDS: &[&str] = &["func", "interface", "package", "const", "import", "var"];

const CONTROL_FLOW: &[&str] = &[
    "break",
    "case",
    "continue",
    "default",
    "fallthrough",
    "else",
    "for",
    "goto",
    "if",
    "return",
    "switch",
    "range",
    "select",
];

const TYPENAMES: &[&str] = &[
    "int",
    "int8",
    "int16",
    "int32",
    "int64",
    "uint",
    "uint8",
    "uint16",
    "uint32",
    "uint64",
    "uintptr",
    "float",
    "float32",
    "float64",
    "complex",
    "complex64",
    "complex128",
    "string",
    "byte",
    "rune",
    "bool",
    "error",
    "any",
    "map",
    "struct",
    "type",
];

const MARKERS: &[&str] = &[
    "import",
    "package",
    "defer",
    "go",
    "make",
    "chan",
    "__VA_ARGS__",
    "__FILE__",
    "__func__",
    "__FUNCTION__",
    "__LINE__",
    "__DATE__",
    "__TIME__",
    "__STDC__",
    "__STDC_VERSION__",
    "__STDC_HOSTED__",
    "__cplusplus",
    "__OBJC__",
    "__ASSEMBLER__",
];

const CONSTANTS: &[&str] = &[
    "NULL", "stdin", "stdout", "stderr", "nil", "true", "false", "iota",
];

const IDENT: &str = r"[\p{L}_][\p{L}\p{N}_]*";
const INT_SUFFIX: &str = r"(?:[uU][lL]{0,2}|[lL]{1,2}[uU]?)?";

/// Default Go keyword table
///
/// List order decides ties: `import` and `package` are declaration
/// keywords even though they also appear among the markers.
pub fn go_keywords() -> KeywordTable {
    let mut table = KeywordTable::new();
    table.extend(TokenType::Keyword, KEYWORDS.iter().copied());
    table.extend(TokenType::ControlFlow, CONTROL_FLOW.iter().copied());
    table.extend(TokenType::Type, TYPENAMES.iter().copied());
    table.extend(TokenType::Preprocessor, MARKERS.iter().copied());
    table.extend(TokenType::Constant, CONSTANTS.iter().copied());
    table
}

/// Priority of the keyword rule for each list
fn keyword_priority(token_type: TokenType) -> i32 {
    match token_type {
        TokenType::Keyword => 60,
        TokenType::ControlFlow => 59,
        TokenType::Type => 58,
        TokenType::Preprocessor => 57,
        TokenType::Constant => 56,
        _ => 55,
    }
}

/// Create the Go language definition
///
/// A rule whose pattern does not compile is logged and left out; the
/// remaining rules still apply.
pub fn go_language(keywords: &KeywordTable, engine: &dyn PatternEngine) -> LanguageDefinition {
    let mut lang = LanguageDefinition::new("Go");
    lang.add_extension("go");

    let skip = |err: SyntaxError| warn!("{err}; rule disabled");

    // Multiline rules
    let multiline = [
        MultilineRule::new(
            engine,
            "block_comment",
            r"/\*",
            r"\*/",
            TokenType::Comment,
            100,
            BLOCK_COMMENT,
        ),
        MultilineRule::with_options(
            engine,
            "disabled_code",
            (
                r"^[ \t]*#[ \t]*if[ \t]+0",
                r"^[ \t]*#[ \t]*(?:elifdef|elif|else|endif)",
            ),
            CompileOptions::case_insensitive(),
            TokenType::Comment,
            100,
            DISABLED_CODE,
        )
        .map(MultilineRule::with_word_boundary),
        MultilineRule::new(engine, "raw_string", "`", "`", TokenType::String, 85, RAW_STRING),
    ];
    for rule in multiline {
        match rule {
            Ok(rule) => lang.add_multiline(rule),
            Err(err) => skip(err),
        }
    }

    // Single-line patterns
    let call = format!(r"({IDENT})\s*\(");
    let hex = format!(r"-?0[xX][0-9a-fA-F]+{INT_SUFFIX}");
    let float = r"-?(?:[0-9]+\.[0-9]*|\.[0-9]+)(?:[eE][-+]?[0-9]+)?[fFlL]?";
    let integer = format!(r"-?[0-9]+{INT_SUFFIX}");
    let label = format!(r"^[ \t]*({IDENT})[ \t]*:(?:[^=]|$)");
    let field = format!(r"(?:\.|->)[ \t]*({IDENT})");

    let mut patterns = vec![
        PatternRule::new(engine, "line_comment", r"//.*$", TokenType::Comment, 100),
        PatternRule::new(engine, "char", r"'(?:[^'\\]|\\.)'", TokenType::Char, 90),
        PatternRule::new(engine, "string", r#""(?:[^"\\]|\\.)*(?:"|\\?$)"#, TokenType::String, 85)
            .and_then(|rule| rule.with_nested(engine, r"\\.", TokenType::Escape)),
        PatternRule::new(engine, "call", &call, TokenType::Call, 80)
            .map(|rule| rule.with_word_boundary().excluding(keywords.words())),
        PatternRule::new(engine, "hex", &hex, TokenType::Number, 72)
            .map(PatternRule::with_word_boundary),
        PatternRule::new(engine, "float", float, TokenType::Number, 71)
            .map(PatternRule::with_word_boundary),
        PatternRule::new(engine, "integer", &integer, TokenType::Number, 70)
            .map(PatternRule::with_word_boundary),
        PatternRule::new(engine, "label", &label, TokenType::Label, 50),
        PatternRule::new(engine, "field", &field, TokenType::Field, 40)
            .map(PatternRule::with_word_boundary),
    ];

    for list in keywords.lists() {
        if list.words.is_empty() {
            continue;
        }
        let name = format!("{}_keywords", list.token_type.name().to_lowercase());
        patterns.push(
            PatternRule::new(
                engine,
                &name,
                &list.alternation(),
                list.token_type,
                keyword_priority(list.token_type),
            )
            .map(PatternRule::with_word_boundary),
        );
    }

    for rule in patterns {
        match rule {
            Ok(rule) => lang.add_pattern(rule),
            Err(err) => skip(err),
        }
    }

    lang
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::PatternError;
    use crate::syntax::pattern::{CompiledPattern, RegexEngine};
    use crate::syntax::rules::{HighlightResult, RangeState};
    use crate::syntax::style::Span;

    fn classify(text: &str) -> HighlightResult {
        go_language(&go_keywords(), &RegexEngine).classify(text, RangeState::default())
    }

    /// (token, text) pairs for a line classified from the closed state
    fn tokens(text: &str) -> Vec<(TokenType, String)> {
        classify(text)
            .spans
            .iter()
            .map(|s| (s.token_type, s.text(text).to_string()))
            .collect()
    }

    fn tok(token_type: TokenType, text: &str) -> (TokenType, String) {
        (token_type, text.to_string())
    }

    #[test]
    fn test_main_func_scenario() {
        assert_eq!(tokens(r#"func main() { fmt.Println("hi") }"#), vec![
            tok(TokenType::Keyword, "func"),
            tok(TokenType::Call, "main"),
            tok(TokenType::Call, "Println"),
            tok(TokenType::String, r#""hi""#),
        ]);
    }

    #[test]
    fn test_line_comment_runs_to_eol() {
        let text = r#"x := 1 // "quoted" and /* not a block"#;
        let result = classify(text);
        assert_eq!(result.spans.last(), Some(&Span::new(7, text.len(), TokenType::Comment)));
        assert_eq!(result.end_state, RangeState::Closed);
        // Classification is a pure function of its input
        assert_eq!(classify(text), result);
    }

    #[test]
    fn test_comment_marker_inside_string_is_text() {
        assert_eq!(tokens(r#"url := "http://x""#), vec![
            tok(TokenType::String, r#""http://x""#),
        ]);
    }

    #[test]
    fn test_string_with_escaped_quote() {
        let text = r#"s := "say \"hi\"" + x"#;
        let result = classify(text);
        assert_eq!(result.spans, vec![
            Span::new(5, 17, TokenType::String),
            Span::new(10, 12, TokenType::Escape),
            Span::new(14, 16, TokenType::Escape),
        ]);
    }

    #[test]
    fn test_unterminated_string_runs_to_eol() {
        let text = r#"s := "open \"still"#;
        let result = classify(text);
        assert_eq!(result.spans[0], Span::new(5, text.len(), TokenType::String));
        assert_eq!(result.end_state, RangeState::Closed);

        let trailing = r#"s := "ends in \"#;
        let result = classify(trailing);
        assert_eq!(result.spans[0], Span::new(5, trailing.len(), TokenType::String));
    }

    #[test]
    fn test_char_literals() {
        assert_eq!(tokens(r"c := 'a'"), vec![tok(TokenType::Char, "'a'")]);
        assert_eq!(tokens(r"c := '\n'"), vec![tok(TokenType::Char, r"'\n'")]);
    }

    #[test]
    fn test_block_comment_round_trip() {
        let lang = go_language(&go_keywords(), &RegexEngine);
        let first = lang.classify("x := 1 /* start", RangeState::default());
        assert_eq!(first.end_state, RangeState::Open(BLOCK_COMMENT));

        let middle = lang.classify("for if return", first.end_state);
        assert_eq!(middle.spans, vec![Span::new(0, 13, TokenType::Comment)]);
        assert_eq!(middle.end_state, RangeState::Open(BLOCK_COMMENT));

        let last = lang.classify("*/", middle.end_state);
        assert_eq!(last.spans, vec![Span::new(0, 2, TokenType::Comment)]);
        assert_eq!(last.end_state, RangeState::Closed);
    }

    #[test]
    fn test_block_comment_on_one_line() {
        assert_eq!(tokens("/* a */ return"), vec![
            tok(TokenType::Comment, "/* a */"),
            tok(TokenType::ControlFlow, "return"),
        ]);
    }

    #[test]
    fn test_disabled_code_block() {
        let lang = go_language(&go_keywords(), &RegexEngine);
        let open = lang.classify("#IF 0", RangeState::default());
        assert_eq!(open.spans, vec![Span::new(0, 5, TokenType::Comment)]);
        assert_eq!(open.end_state, RangeState::Open(DISABLED_CODE));

        let inside = lang.classify("func dead() {}", open.end_state);
        assert_eq!(inside.spans, vec![Span::new(0, 14, TokenType::Comment)]);

        let close = lang.classify("#else", inside.end_state);
        assert_eq!(close.spans, vec![Span::new(0, 5, TokenType::Comment)]);
        assert_eq!(close.end_state, RangeState::Closed);
    }

    #[test]
    fn test_disabled_code_needs_word_boundary() {
        assert_eq!(classify("#if 01").end_state, RangeState::Closed);
        assert_eq!(classify("#ifdef 0").end_state, RangeState::Closed);

        let lang = go_language(&go_keywords(), &RegexEngine);
        let state = RangeState::Open(DISABLED_CODE);
        assert_eq!(lang.classify("#endiff", state).end_state, state);
        assert_eq!(lang.classify("  # endif", state).end_state, RangeState::Closed);
        assert_eq!(lang.classify("#elifdef X", state).end_state, RangeState::Closed);
    }

    #[test]
    fn test_raw_string_spans_lines() {
        let lang = go_language(&go_keywords(), &RegexEngine);
        let open = lang.classify("q := `select *", RangeState::default());
        assert_eq!(open.spans, vec![Span::new(5, 14, TokenType::String)]);
        assert_eq!(open.end_state, RangeState::Open(RAW_STRING));

        let close = lang.classify(r"from t\n` + 1", open.end_state);
        assert_eq!(close.spans, vec![
            Span::new(0, 9, TokenType::String),
            Span::new(12, 13, TokenType::Number),
        ]);
        assert_eq!(close.end_state, RangeState::Closed);
    }

    #[test]
    fn test_keyword_word_boundaries() {
        assert!(tokens("forever := format").is_empty());
        assert_eq!(tokens("x for y"), vec![tok(TokenType::ControlFlow, "for")]);
        assert_eq!(tokens("var n int8"), vec![
            tok(TokenType::Keyword, "var"),
            tok(TokenType::Type, "int8"),
        ]);
    }

    #[test]
    fn test_keyword_list_priority() {
        assert_eq!(tokens("import \"os\""), vec![
            tok(TokenType::Keyword, "import"),
            tok(TokenType::String, "\"os\""),
        ]);
        assert_eq!(tokens("defer f.Close()"), vec![
            tok(TokenType::Preprocessor, "defer"),
            tok(TokenType::Call, "Close"),
        ]);
        assert_eq!(tokens("return nil"), vec![
            tok(TokenType::ControlFlow, "return"),
            tok(TokenType::Constant, "nil"),
        ]);
    }

    #[test]
    fn test_keywords_are_not_calls() {
        assert_eq!(tokens("if (x) {"), vec![tok(TokenType::ControlFlow, "if")]);
        assert_eq!(tokens("n := int64(x)"), vec![tok(TokenType::Type, "int64")]);
        assert_eq!(tokens("func (r *T) Get()"), vec![
            tok(TokenType::Keyword, "func"),
            tok(TokenType::Call, "Get"),
        ]);
    }

    #[test]
    fn test_call_allows_space_before_paren() {
        assert_eq!(tokens("doIt (1)"), vec![
            tok(TokenType::Call, "doIt"),
            tok(TokenType::Number, "1"),
        ]);
    }

    #[test]
    fn test_numbers() {
        assert_eq!(tokens("x = -3.14f"), vec![tok(TokenType::Number, "-3.14f")]);
        assert_eq!(tokens("y := a-3"), vec![tok(TokenType::Number, "3")]);
        assert_eq!(tokens("m := 0xFFu"), vec![tok(TokenType::Number, "0xFFu")]);
        assert_eq!(tokens("e := 1.5e-3"), vec![tok(TokenType::Number, "1.5e-3")]);
        assert_eq!(tokens("f := .5"), vec![tok(TokenType::Number, ".5")]);
        assert_eq!(tokens("n := 42UL"), vec![tok(TokenType::Number, "42UL")]);
        assert!(tokens("v2 := x2").is_empty());
    }

    #[test]
    fn test_labels() {
        assert_eq!(tokens("outer:"), vec![tok(TokenType::Label, "outer")]);
        assert_eq!(tokens("  retry :"), vec![tok(TokenType::Label, "retry")]);
        assert_eq!(tokens("x := 1"), vec![tok(TokenType::Number, "1")]);
        assert_eq!(tokens("default:"), vec![tok(TokenType::ControlFlow, "default")]);
    }

    #[test]
    fn test_field_access() {
        assert_eq!(tokens("n := len(os.Args)"), vec![
            tok(TokenType::Call, "len"),
            tok(TokenType::Field, "Args"),
        ]);
        assert_eq!(tokens("p->next"), vec![tok(TokenType::Field, "next")]);
    }

    #[test]
    fn test_spans_are_ordered() {
        let text = r#"for i := 0; i < len(s); i++ { fmt.Printf("%d\n", s.N) } // done"#;
        let spans = classify(text).spans;
        assert!(spans.windows(2).all(|w| w[0].start <= w[1].start));
        assert!(spans.iter().all(|s| s.end <= text.len() && !s.is_empty()));
    }

    #[test]
    fn test_go_keywords_contents() {
        let table = go_keywords();
        assert_eq!(table.lookup("func"), Some(TokenType::Keyword));
        assert_eq!(table.lookup("package"), Some(TokenType::Keyword));
        assert_eq!(table.lookup("fallthrough"), Some(TokenType::ControlFlow));
        assert_eq!(table.lookup("complex128"), Some(TokenType::Type));
        assert_eq!(table.lookup("chan"), Some(TokenType::Preprocessor));
        assert_eq!(table.lookup("__LINE__"), Some(TokenType::Preprocessor));
        assert_eq!(table.lookup("stderr"), Some(TokenType::Constant));
    }

    /// Backend that refuses one specific pattern
    struct RejectingEngine(&'static str);

    impl PatternEngine for RejectingEngine {
        fn compile(
            &self,
            source: &str,
            options: CompileOptions,
        ) -> Result<Box<dyn CompiledPattern>, PatternError> {
            if source == self.0 {
                return Err(PatternError("rejected".to_string()));
            }
            RegexEngine.compile(source, options)
        }
    }

    #[test]
    fn test_broken_rule_is_skipped() {
        let engine = RejectingEngine(r"//.*$");
        let lang = go_language(&go_keywords(), &engine);
        assert!(lang.patterns.iter().all(|r| r.name != "line_comment"));

        let result = lang.classify("return // x", RangeState::default());
        assert_eq!(result.spans[0], Span::new(0, 6, TokenType::ControlFlow));
        assert!(result.spans.iter().all(|s| s.token_type != TokenType::Comment));
    }

    #[test]
    fn test_long_line_scales() {
        let text = "a.b(c) + x1 ".repeat(4000);
        let started = std::time::Instant::now();
        let result = classify(&text);
        let elapsed = started.elapsed();

        assert_eq!(result.spans.len(), 4000);
        for (i, span) in result.spans.iter().enumerate() {
            assert_eq!(*span, Span::new(i * 12 + 2, i * 12 + 3, TokenType::Call));
        }
        assert!(elapsed < std::time::Duration::from_secs(5), "took {elapsed:?}");
    }

    #[test]
    fn test_repeated_segments_classify_alike() {
        let segment = r#"if v.ok("a\n", 0x1F) { go f(-2.5) } "#;
        let single = classify(segment).spans;
        let repeated = classify(&segment.repeat(3)).spans;

        assert_eq!(repeated.len(), single.len() * 3);
        for (copy, chunk) in repeated.chunks(single.len()).enumerate() {
            let shift = copy * segment.len();
            let moved: Vec<Span> = single
                .iter()
                .map(|s| Span::new(s.start + shift, s.end + shift, s.token_type))
                .collect();
            assert_eq!(chunk, moved.as_slice());
        }
    }
}
