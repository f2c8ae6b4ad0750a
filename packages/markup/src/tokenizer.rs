use logos::Logos;

/// Top-level markup tokens.
///
/// Only the cheap delimiters are recognised here. Attribute lists, comment
/// bodies and raw text are scanned by the parser straight from the lexer
/// remainder, since their extent depends on quoting and on the element that
/// opened them.
#[derive(Logos, Debug, Clone, PartialEq)]
pub enum Token<'src> {
    #[token("<!--")]
    CommentOpen,

    #[regex(r"<![a-zA-Z][^>]*>", |lex| lex.slice())]
    Declaration(&'src str),

    #[regex(r"</[a-zA-Z][a-zA-Z0-9_.-]*", |lex| &lex.slice()[2..])]
    EndTagOpen(&'src str),

    #[regex(r"<[a-zA-Z][a-zA-Z0-9_.-]*", |lex| &lex.slice()[1..])]
    TagOpen(&'src str),

    /// A `<` that does not start markup
    #[token("<")]
    Lt,

    #[regex(r"[^<]+", |lex| lex.slice())]
    Text(&'src str),
}

/// Tokenize markup into a flat list of tokens with byte ranges.
///
/// Handy for debugging; the parser drives the lexer directly.
pub fn tokenize(source: &str) -> Vec<(Token, std::ops::Range<usize>)> {
    let lexer = Token::lexer(source);
    lexer
        .spanned()
        .filter_map(|(result, span)| result.ok().map(|token| (token, span)))
        .collect()
}
