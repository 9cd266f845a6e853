use chumsky::prelude::*;

use crate::diagnostic::{Diagnostic, Label, Span};
use crate::token::Token;

pub fn lexer<'a>() -> impl Parser<'a, &'a str, Vec<(Token, SimpleSpan)>, extra::Err<Simple<'a, char>>> {
    let number = text::int(10)
        .then(just('.').then(text::digits(10)).or_not())
        .to_slice()
        .map(|s: &str| Token::Number(s.parse().unwrap_or_default()));

    let escape = just('\\').ignore_then(choice((
        just('\\'),
        just('/'),
        just('"'),
        just('n').to('\n'),
        just('r').to('\r'),
        just('t').to('\t'),
    )));

    let string = just('"')
        .ignore_then(none_of("\\\"").or(escape).repeated().collect::<String>())
        .then_ignore(just('"'))
        .map(Token::String);

    let word = text::ident().map(|s: &str| Token::keyword(s).unwrap_or_else(|| Token::Ident(s.to_string())));

    let op_double = choice((
        just("==").to(Token::Eq),
        just("!=").to(Token::NotEq),
        just(">=").to(Token::GreaterEq),
        just("<=").to(Token::LessEq),
        just("&&").to(Token::And),
        just("||").to(Token::Or),
    ));

    let op_single = choice((
        just('+').to(Token::Plus),
        just('-').to(Token::Minus),
        just('*').to(Token::Star),
        just('/').to(Token::Slash),
        just('%').to(Token::Percent),
        just('>').to(Token::Greater),
        just('<').to(Token::Less),
        just('!').to(Token::Bang),
        just('=').to(Token::Assign),
        just('.').to(Token::Dot),
        just(',').to(Token::Comma),
        just(':').to(Token::Colon),
        just(';').to(Token::Semicolon),
        just('(').to(Token::LParen),
        just(')').to(Token::RParen),
        just('{').to(Token::LBrace),
        just('}').to(Token::RBrace),
    ));

    let comment = just("//")
        .then(any().and_is(just('\n').not()).repeated())
        .padded();

    let token = number
        .or(string)
        .or(word)
        .or(op_double)
        .or(op_single)
        .map_with(|tok, e| (tok, e.span()))
        .padded_by(comment.repeated())
        .padded()
        .recover_with(skip_then_retry_until(any().ignored(), end()));

    token.repeated().collect().then_ignore(end())
}

/// Runs the lexer and converts any failures into diagnostics (code E0001).
pub fn tokenize(source: &str) -> Result<Vec<(Token, SimpleSpan)>, Vec<Diagnostic>> {
    let (tokens, errors) = lexer().parse(source).into_output_errors();
    if errors.is_empty() {
        if let Some(tokens) = tokens {
            return Ok(tokens);
        }
    }

    let mut diagnostics: Vec<Diagnostic> = errors
        .iter()
        .map(|error| {
            let span = Span::from(*error.span());
            let found = source
                .get(span.start..)
                .and_then(|rest| rest.chars().next())
                .map(|ch| format!("unexpected character `{}`", ch))
                .unwrap_or_else(|| "unexpected end of input".to_string());
            Diagnostic::error(found)
                .with_code("E0001")
                .with_label(Label::primary(span, "not valid here"))
        })
        .collect();
    if diagnostics.is_empty() {
        diagnostics.push(Diagnostic::error("lexer failed to tokenize input").with_code("E0001"));
    }
    Err(diagnostics)
}
