//! Integration tests for the HTML tokenizer.

use tagscan_common::warning::has_warned;
use tagscan_html::{Token, TokenKind, Tokenizer, TokenizerConfig, TokenizerContext};

/// Helper to tokenize each piece in turn with one tokenizer, pairing every
/// token with the text it covers in its piece
fn tokenize_pieces(tokenizer: &mut Tokenizer, pieces: &[&str]) -> Vec<(TokenKind, String)> {
    let mut tokens = Vec::new();
    for piece in pieces {
        tokenizer.tokenize(piece, |token| {
            tokens.push((token.kind, piece[token.range()].to_string()));
        });
    }
    tokens
}

/// Helper to tokenize a string with a fresh tokenizer
fn tokenize(input: &str) -> Vec<(TokenKind, String)> {
    tokenize_pieces(&mut Tokenizer::new(), &[input])
}

/// Helper to build the expected stream
fn expect(tokens: &[(TokenKind, &str)]) -> Vec<(TokenKind, String)> {
    tokens
        .iter()
        .map(|&(kind, text)| (kind, text.to_string()))
        .collect()
}

#[test]
fn test_plain_text() {
    assert_eq!(tokenize("Hello"), expect(&[(TokenKind::Text, "Hello")]));
}

#[test]
fn test_tag_with_quoted_attribute() {
    let tokens = tokenize(r#"<div class="a">text</div>"#);
    assert_eq!(
        tokens,
        expect(&[
            (TokenKind::TagStart, "<"),
            (TokenKind::TagName, "div"),
            (TokenKind::Whitespace, " "),
            (TokenKind::AttributeName, "class"),
            (TokenKind::Equal, "="),
            (TokenKind::AttributeQuotedValueStart, "\""),
            (TokenKind::AttributeQuotedValue, "a"),
            (TokenKind::AttributeQuotedValueEnd, "\""),
            (TokenKind::TagEnd, ">"),
            (TokenKind::Text, "text"),
            (TokenKind::TagStart, "<"),
            (TokenKind::Solidus, "/"),
            (TokenKind::TagName, "div"),
            (TokenKind::TagEnd, ">"),
        ])
    );
}

#[test]
fn test_unquoted_and_bare_attributes() {
    let tokens = tokenize("<input type=text disabled/>");
    assert_eq!(
        tokens,
        expect(&[
            (TokenKind::TagStart, "<"),
            (TokenKind::TagName, "input"),
            (TokenKind::Whitespace, " "),
            (TokenKind::AttributeName, "type"),
            (TokenKind::Equal, "="),
            (TokenKind::AttributeUnquotedValue, "text"),
            (TokenKind::Whitespace, " "),
            (TokenKind::AttributeName, "disabled"),
            (TokenKind::Solidus, "/"),
            (TokenKind::TagEnd, ">"),
        ])
    );
}

#[test]
fn test_whitespace_around_equal() {
    let tokens = tokenize("<a b = 'c'>");
    assert_eq!(
        tokens,
        expect(&[
            (TokenKind::TagStart, "<"),
            (TokenKind::TagName, "a"),
            (TokenKind::Whitespace, " "),
            (TokenKind::AttributeName, "b"),
            (TokenKind::Whitespace, " "),
            (TokenKind::Equal, "="),
            (TokenKind::Whitespace, " "),
            (TokenKind::AttributeQuotedValueStart, "'"),
            (TokenKind::AttributeQuotedValue, "c"),
            (TokenKind::AttributeQuotedValueEnd, "'"),
            (TokenKind::TagEnd, ">"),
        ])
    );
}

#[test]
fn test_other_quote_inside_value() {
    let tokens = tokenize(r#"<a title='say "hi"'>"#);
    assert!(tokens.contains(&(TokenKind::AttributeQuotedValue, r#"say "hi""#.to_string())));
}

#[test]
fn test_doctype() {
    let mut tokenizer = Tokenizer::new();
    let tokens = tokenize_pieces(&mut tokenizer, &["<!DOCTYPE html>"]);
    assert_eq!(
        tokens,
        expect(&[
            (TokenKind::TagStart, "<"),
            (TokenKind::TagName, "!DOCTYPE"),
            (TokenKind::Whitespace, " "),
            (TokenKind::AttributeName, "html"),
            (TokenKind::TagEnd, ">"),
        ])
    );
    assert_eq!(tokenizer.current_tag_name(), b"!DOCTYPE");
    assert!(!tokenizer.is_closing_tag());
}

#[test]
fn test_doctype_is_case_insensitive() {
    let tokens = tokenize("<!doctype html>");
    assert_eq!(tokens[1], (TokenKind::TagName, "!doctype".to_string()));
}

#[test]
fn test_comment() {
    assert_eq!(
        tokenize("<!-- hi -->x"),
        expect(&[
            (TokenKind::CommentStart, "<!--"),
            (TokenKind::Text, " hi "),
            (TokenKind::CommentEnd, "-->"),
            (TokenKind::Text, "x"),
        ])
    );
}

#[test]
fn test_empty_comment_has_no_text() {
    assert_eq!(
        tokenize("<!---->"),
        expect(&[
            (TokenKind::CommentStart, "<!--"),
            (TokenKind::CommentEnd, "-->"),
        ])
    );
}

#[test]
fn test_cdata() {
    assert_eq!(
        tokenize("<![CDATA[a<b]]>"),
        expect(&[
            (TokenKind::CdataStart, "<![CDATA["),
            (TokenKind::Text, "a<b"),
            (TokenKind::CdataEnd, "]]>"),
        ])
    );
}

#[test]
fn test_script_body_is_text() {
    let tokens = tokenize("<script>if (a < b) { }</script>");
    assert_eq!(
        tokens,
        expect(&[
            (TokenKind::TagStart, "<"),
            (TokenKind::TagName, "script"),
            (TokenKind::TagEnd, ">"),
            (TokenKind::Text, "if (a "),
            (TokenKind::Text, "<"),
            (TokenKind::Text, " b) { }"),
            (TokenKind::TagStart, "<"),
            (TokenKind::Solidus, "/"),
            (TokenKind::TagName, "script"),
            (TokenKind::TagEnd, ">"),
        ])
    );
}

#[test]
fn test_rawtext_needs_exact_closing_name() {
    let mut tokenizer = Tokenizer::new();
    let tokens = tokenize_pieces(&mut tokenizer, &["<style></styles>"]);
    assert_eq!(
        &tokens[3..],
        expect(&[(TokenKind::Text, "</styles"), (TokenKind::Text, ">")])
    );
    assert_eq!(tokenizer.context(), TokenizerContext::Rawtext);
}

#[test]
fn test_rawtext_close_ignores_case() {
    let mut tokenizer = Tokenizer::new();
    let _ = tokenize_pieces(&mut tokenizer, &["<TITLE>a<b></title>"]);
    assert_eq!(tokenizer.context(), TokenizerContext::Html);
    assert!(tokenizer.is_closing_tag());
}

#[test]
fn test_rcdata_context() {
    let mut tokenizer = Tokenizer::new();
    let _ = tokenize_pieces(&mut tokenizer, &["<textarea>"]);
    assert_eq!(tokenizer.context(), TokenizerContext::Rcdata);
    assert!(tokenizer.in_rawtext());
    assert_eq!(
        tokenizer.contexts(),
        [TokenizerContext::Html, TokenizerContext::Rcdata]
    );
}

#[test]
fn test_closing_tag_does_not_enter_rawtext() {
    let mut tokenizer = Tokenizer::new();
    let _ = tokenize_pieces(&mut tokenizer, &["</script>"]);
    assert_eq!(tokenizer.context(), TokenizerContext::Html);
}

#[test]
fn test_plaintext_runs_to_end() {
    let mut tokenizer = Tokenizer::new();
    let tokens = tokenize_pieces(&mut tokenizer, &["<plaintext>a</plaintext>", "<b>"]);
    assert_eq!(
        &tokens[3..],
        expect(&[
            (TokenKind::Text, "a</plaintext>"),
            (TokenKind::Text, "<b>"),
        ])
    );
    assert_eq!(tokenizer.context(), TokenizerContext::Plaintext);
}

#[test]
fn test_malformed_tail() {
    let mut tokenizer = Tokenizer::new();
    let tokens = tokenize_pieces(&mut tokenizer, &["<a $b>"]);
    assert_eq!(
        tokens,
        expect(&[
            (TokenKind::TagStart, "<"),
            (TokenKind::TagName, "a"),
            (TokenKind::Whitespace, " "),
            (TokenKind::Malformed, "$b>"),
        ])
    );
    assert_eq!(tokenizer.last_token(), TokenKind::Malformed);
    assert_eq!(tokenizer.context(), TokenizerContext::OpenTag);
    assert!(has_warned("Tokenizer", "malformed input in OPEN_TAG context"));
}

#[test]
fn test_malformed_warning_is_keyed_without_position() {
    let _ = tokenize("<p #x>");
    let _ = tokenize("text\n<section  $y>");
    assert!(has_warned("Tokenizer", "malformed input in OPEN_TAG context"));
    assert!(!has_warned(
        "Tokenizer",
        "malformed input at byte 3 in OPEN_TAG context"
    ));
    assert!(!has_warned(
        "Tokenizer",
        "malformed input at byte 15 in OPEN_TAG context"
    ));
}

#[test]
fn test_context_depth_guard() {
    let config = TokenizerConfig::default().with_max_context_depth(2);
    let mut tokenizer = Tokenizer::with_config(config);
    let tokens = tokenize_pieces(&mut tokenizer, &["a<p>"]);
    assert_eq!(
        tokens,
        expect(&[(TokenKind::Text, "a"), (TokenKind::Malformed, "<p>")])
    );
    assert!(tokenizer.contexts().len() <= 2);
    assert!(has_warned(
        "Tokenizer",
        "context stack full (2 entries) entering SOLIDUS_OR_TAG_NAME"
    ));
}

#[test]
fn test_state_persists_across_calls() {
    let mut tokenizer = Tokenizer::new();
    let tokens = tokenize_pieces(&mut tokenizer, &["<scr", "ipt>x<", "/script>"]);
    assert_eq!(
        tokens,
        expect(&[
            (TokenKind::TagStart, "<"),
            (TokenKind::TagName, "scr"),
            (TokenKind::TagName, "ipt"),
            (TokenKind::TagEnd, ">"),
            (TokenKind::Text, "x"),
            (TokenKind::Text, "<"),
            (TokenKind::Text, "/script>"),
        ])
    );
    // The split closing tag is not recognized.
    assert_eq!(tokenizer.current_tag_name(), b"script");
    assert_eq!(tokenizer.context(), TokenizerContext::ScriptData);
}

#[test]
fn test_positions_count_bytes_and_chars() {
    let mut tokens: Vec<Token> = Vec::new();
    Tokenizer::new().tokenize("é<b>", |token| tokens.push(token));
    assert_eq!(tokens[0].kind, TokenKind::Text);
    assert_eq!((tokens[0].length, tokens[0].char_length), (2, 1));
    assert_eq!((tokens[1].start, tokens[1].char_start), (2, 1));
    assert_eq!(tokens[3].char_end(), 4);
}

#[test]
fn test_reset_returns_to_html() {
    let mut tokenizer = Tokenizer::new();
    let _ = tokenize_pieces(&mut tokenizer, &["<script>"]);
    tokenizer.reset();
    assert_eq!(tokenizer.context(), TokenizerContext::Html);
    assert!(tokenizer.current_tag_name().is_empty());
    assert_eq!(tokenizer.last_token(), TokenKind::None);
}

#[test]
fn test_kind_names() {
    assert_eq!(
        TokenKind::AttributeQuotedValueEnd.to_string(),
        "attribute_quoted_value_end"
    );
    assert_eq!("cdata_start".parse::<TokenKind>(), Ok(TokenKind::CdataStart));
}
