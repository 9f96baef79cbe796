//! Property tests for chunked input.

use quickcheck::{Arbitrary, Gen, TestResult};
use quickcheck_macros::quickcheck;
use tagscan_html::{ParsedToken, Parser};

const TAG_NAMES: &[&str] = &["div", "span", "a", "p", "br", "my-widget"];
const ATTRIBUTE_NAMES: &[&str] = &["class", "id", "data-x", "href", "disabled"];
const WORDS: &[&str] = &["hello", " ", "\n", "日本", "café", "a\r\nb", "x=y", "'q'"];

/// A piece of well-formed markup.
#[derive(Debug, Clone)]
enum Piece {
    Text(&'static str),
    Open(&'static str, Vec<(&'static str, Value)>),
    Close(&'static str),
    SelfClosing(&'static str),
}

#[derive(Debug, Clone)]
enum Value {
    Bare,
    Double(String),
    Single(String),
    Unquoted(String),
}

/// Helper to pick one of `items`
fn pick(g: &mut Gen, items: &[&'static str]) -> &'static str {
    g.choose(items).copied().unwrap_or_default()
}

impl Arbitrary for Value {
    fn arbitrary(g: &mut Gen) -> Self {
        let text: String = String::arbitrary(g)
            .chars()
            .filter(|c| !matches!(c, '"' | '\'' | '>') && !c.is_whitespace())
            .collect();
        match u8::arbitrary(g) % 4 {
            0 => Self::Bare,
            1 => Self::Double(text),
            2 => Self::Single(text),
            _ if text.is_empty() => Self::Bare,
            _ => Self::Unquoted(text),
        }
    }
}

impl Arbitrary for Piece {
    fn arbitrary(g: &mut Gen) -> Self {
        match u8::arbitrary(g) % 4 {
            0 => Self::Text(pick(g, WORDS)),
            1 => {
                let count = usize::arbitrary(g) % 3;
                let attributes = (0..count)
                    .map(|_| (pick(g, ATTRIBUTE_NAMES), Value::arbitrary(g)))
                    .collect();
                Self::Open(pick(g, TAG_NAMES), attributes)
            }
            2 => Self::Close(pick(g, TAG_NAMES)),
            _ => Self::SelfClosing(pick(g, TAG_NAMES)),
        }
    }
}

/// Helper to render pieces as markup
fn render(pieces: &[Piece]) -> String {
    let mut html = String::new();
    for piece in pieces {
        match piece {
            Piece::Text(text) => html.push_str(text),
            Piece::Open(name, attributes) => {
                html.push('<');
                html.push_str(name);
                for (attribute, value) in attributes {
                    html.push(' ');
                    html.push_str(attribute);
                    match value {
                        Value::Bare => {}
                        Value::Double(text) => html.push_str(&format!("=\"{text}\"")),
                        Value::Single(text) => html.push_str(&format!("='{text}'")),
                        Value::Unquoted(text) => html.push_str(&format!("={text}")),
                    }
                }
                html.push('>');
            }
            Piece::Close(name) => html.push_str(&format!("</{name}>")),
            Piece::SelfClosing(name) => html.push_str(&format!("<{name} />")),
        }
    }
    html
}

/// Helper to cut `text` at the char boundaries nearest to `cuts`
fn split<'a>(text: &'a str, cuts: &[usize]) -> Vec<&'a str> {
    let mut points: Vec<usize> = cuts
        .iter()
        .filter(|_| !text.is_empty())
        .map(|cut| {
            let mut point = cut % (text.len() + 1);
            while !text.is_char_boundary(point) {
                point -= 1;
            }
            point
        })
        .collect();
    points.push(0);
    points.push(text.len());
    points.sort_unstable();
    points.dedup();
    points.windows(2).map(|pair| &text[pair[0]..pair[1]]).collect()
}

/// Everything observable about a parser, for comparing two of them
fn snapshot(parser: &Parser) -> String {
    format!(
        "{} {:?} {} {} {:?} {:?} {} {:?} {}:{} {:?} {}",
        parser.context(),
        parser.tag_name(),
        parser.is_closing_tag(),
        parser.is_self_closing_tag(),
        parser.attribute_name(),
        parser.attribute_value(),
        parser.is_attribute_quoted(),
        parser.quote_character(),
        parser.line_number(),
        parser.column_number(),
        parser.errors(),
        parser.document(),
    )
}

/// Helper to compute the line and column of `char_offset` in `text`
fn line_and_column(text: &str, char_offset: usize) -> (usize, usize) {
    let before: Vec<char> = text.chars().take(char_offset).collect();
    let line = 1 + before.iter().filter(|&&c| c == '\n').count();
    let column = before.iter().rev().take_while(|&&c| c != '\n').count();
    (line, column)
}

#[quickcheck]
#[allow(clippy::needless_pass_by_value)]
fn document_is_concatenation_of_chunks(chunks: Vec<(bool, String)>) -> bool {
    let mut parser = Parser::new();
    let mut expected = String::new();
    for (is_placeholder, chunk) in &chunks {
        let appended = if *is_placeholder {
            parser.append_placeholder(chunk)
        } else {
            parser.parse(chunk)
        };
        if appended != Ok(!chunk.is_empty()) {
            return false;
        }
        expected.push_str(chunk);
    }
    parser.document() == expected && parser.document_length() == expected.chars().count()
}

#[quickcheck]
#[allow(clippy::needless_pass_by_value)]
fn tokens_tile_each_chunk(chunks: Vec<String>) -> bool {
    let mut parser = Parser::new();
    for chunk in &chunks {
        let start = parser.document_length();
        let mut tokens: Vec<ParsedToken> = Vec::new();
        if parser
            .parse_with(chunk, |_, token| tokens.push(*token))
            .is_err()
        {
            return false;
        }
        let mut next = start;
        for token in &tokens {
            if token.char_start != next || token.char_end <= token.char_start {
                return false;
            }
            next = token.char_end;
        }
        if next != parser.document_length() {
            return false;
        }
    }
    true
}

#[quickcheck]
#[allow(clippy::needless_pass_by_value)]
fn token_positions_match_document(chunks: Vec<String>) -> TestResult {
    let mut parser = Parser::new();
    let mut tokens: Vec<ParsedToken> = Vec::new();
    for chunk in &chunks {
        if parser
            .parse_with(chunk, |_, token| tokens.push(*token))
            .is_err()
        {
            return TestResult::failed();
        }
    }

    let document = parser.document();
    let mut last_line = 1;
    for token in &tokens {
        let (line, column) = line_and_column(&document, token.char_start);
        if (token.line_number, token.column_number) != (line, column)
            || token.line_number < last_line
        {
            return TestResult::failed();
        }
        last_line = token.line_number;
    }
    let end = line_and_column(&document, parser.document_length());
    TestResult::from_bool(end == (parser.line_number(), parser.column_number()))
}

#[quickcheck]
#[allow(clippy::needless_pass_by_value)]
fn chunking_does_not_change_state(pieces: Vec<Piece>, cuts: Vec<usize>) -> TestResult {
    let html = render(&pieces);
    if html.is_empty() {
        return TestResult::discard();
    }

    let mut whole = Parser::new();
    if whole.parse(&html).is_err() {
        return TestResult::failed();
    }

    let mut chunked = Parser::new();
    for chunk in split(&html, &cuts) {
        if chunked.parse(chunk).is_err() {
            return TestResult::failed();
        }
    }

    TestResult::from_bool(whole.errors_count() == 0 && snapshot(&whole) == snapshot(&chunked))
}

#[test]
fn test_split_helper_keeps_char_boundaries() {
    assert_eq!(split("aé", &[2]), ["a", "é"]);
    assert_eq!(split("abc", &[]), ["abc"]);
    assert_eq!(split("abc", &[1, 1, 7]), ["a", "bc"]);
}
