//! tagscan command-line interface
//!
//! Inspect how a document is tokenized and where the grammar scanner ends up.
//!
//! - `tagscan tokens`: the raw tokenizer stream
//! - `tagscan parse`: tokens with line/column and grammar context, the final
//!   parser state and any errors

use std::borrow::Cow;
use std::io;
use std::num::NonZeroUsize;
use std::path::PathBuf;

use anyhow::Context;
use clap::{Args, Parser as _, Subcommand};
use owo_colors::OwoColorize;
use serde::Serialize;
use tagscan_common::warning::set_warnings_enabled;
use tagscan_html::{ParseIssue, Parser, ParserContext, TokenKind, Tokenizer};

/// tagscan: incremental HTML tokenizer and grammar scanner
#[derive(clap::Parser, Debug)]
#[command(name = "tagscan")]
#[command(author, version, about, long_about = None)]
#[command(after_help = r#"EXAMPLES:
    # Print the token stream of a file
    tagscan tokens ./index.html

    # Only tag names and attribute names
    tagscan tokens --html '<a href=x>' --only tag_name --only attribute_name

    # Grammar state after every token
    tagscan parse ./index.html

    # Feed the input in 16-byte chunks, hiding ERB tags from the grammar
    tagscan parse --erb --chunk-size 16 ./view.html.erb

    # Machine-readable output
    tagscan parse --json --html '<div =>'
"#)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the tokenizer stream
    Tokens(TokensArgs),
    /// Run the grammar scanner and report its state and errors
    Parse(ParseArgs),
}

/// Where the document comes from. Standard input when neither is given.
#[derive(Args, Debug)]
struct InputArgs {
    /// Path to an HTML file
    #[arg(value_name = "FILE")]
    path: Option<PathBuf>,

    /// Scan this HTML string instead of a file
    #[arg(long, value_name = "HTML", conflicts_with = "path")]
    html: Option<String>,
}

#[derive(Args, Debug)]
struct TokensArgs {
    #[command(flatten)]
    input: InputArgs,

    /// Only print tokens of this kind (repeatable)
    #[arg(long = "only", value_name = "KIND")]
    only: Vec<TokenKind>,
}

#[derive(Args, Debug)]
struct ParseArgs {
    #[command(flatten)]
    input: InputArgs,

    /// Treat `<%...%>` spans as placeholders the grammar does not see
    #[arg(long)]
    erb: bool,

    /// Print tokens, final state and errors as JSON
    #[arg(long)]
    json: bool,

    /// Feed the input in pieces of at most this many bytes
    #[arg(long, value_name = "N")]
    chunk_size: Option<NonZeroUsize>,

    /// Do not print scanner warnings to stderr
    #[arg(short, long)]
    quiet: bool,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    match cli.command {
        Command::Tokens(args) => run_tokens(&args),
        Command::Parse(args) => run_parse(&args),
    }
}

impl InputArgs {
    fn read(&self) -> anyhow::Result<String> {
        if let Some(ref html) = self.html {
            Ok(html.clone())
        } else if let Some(ref path) = self.path {
            std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))
        } else {
            io::read_to_string(io::stdin()).context("reading standard input")
        }
    }
}

// =============================================================================
// tokens
// =============================================================================

fn run_tokens(args: &TokensArgs) -> anyhow::Result<()> {
    let html = args.input.read()?;
    let mut tokenizer = Tokenizer::new();
    tokenizer.tokenize(&html, |token| {
        if !args.only.is_empty() && !args.only.contains(&token.kind) {
            return;
        }
        let text = html.get(token.range()).unwrap_or_default();
        println!(
            "{:<30} {}..{} {:?}",
            token.kind.to_string(),
            token.char_start,
            token.char_end(),
            text
        );
    });
    Ok(())
}

// =============================================================================
// parse
// =============================================================================

/// One token as seen through the parser.
#[derive(Debug, Serialize)]
struct TokenRecord {
    kind: TokenKind,
    text: String,
    char_start: usize,
    char_end: usize,
    line_number: usize,
    column_number: usize,
    /// Grammar context after the token was processed.
    context: ParserContext,
}

/// Everything `tagscan parse` reports.
#[derive(Debug, Serialize)]
struct Report {
    tokens: Vec<TokenRecord>,
    context: ParserContext,
    tag_name: Option<String>,
    is_closing_tag: bool,
    is_self_closing_tag: bool,
    document_length: usize,
    line_number: usize,
    column_number: usize,
    errors: Vec<ParseIssue>,
}

/// A stretch of input and whether it is a placeholder.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Segment<'a> {
    text: &'a str,
    placeholder: bool,
}

fn run_parse(args: &ParseArgs) -> anyhow::Result<()> {
    if args.quiet {
        set_warnings_enabled(false);
    }
    let html = args.input.read()?;
    let report = scan(&html, args.erb, args.chunk_size)?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_report(&report);
    }
    Ok(())
}

/// Feed `html` to a fresh parser and record what it sees.
fn scan(html: &str, erb: bool, chunk_size: Option<NonZeroUsize>) -> anyhow::Result<Report> {
    let mut parser = Parser::new();
    let mut tokens = Vec::new();

    for segment in segments(html, erb) {
        if segment.placeholder {
            let _ = parser.append_placeholder(segment.text)?;
            continue;
        }
        for piece in pieces(segment.text, chunk_size) {
            let base = parser.document_length();
            let offsets: Vec<usize> = piece
                .char_indices()
                .map(|(offset, _)| offset)
                .chain([piece.len()])
                .collect();
            let _ = parser.parse_with(piece, |view, token| {
                let byte_at = |char_offset: usize| {
                    offsets
                        .get(char_offset - base)
                        .copied()
                        .unwrap_or(piece.len())
                };
                let text = piece
                    .get(byte_at(token.char_start)..byte_at(token.char_end))
                    .unwrap_or_default();
                tokens.push(TokenRecord {
                    kind: token.kind,
                    text: text.to_string(),
                    char_start: token.char_start,
                    char_end: token.char_end,
                    line_number: token.line_number,
                    column_number: token.column_number,
                    context: view.context(),
                });
            })?;
        }
    }

    Ok(Report {
        tokens,
        context: parser.context(),
        tag_name: parser.tag_name().map(Cow::into_owned),
        is_closing_tag: parser.is_closing_tag(),
        is_self_closing_tag: parser.is_self_closing_tag(),
        document_length: parser.document_length(),
        line_number: parser.line_number(),
        column_number: parser.column_number(),
        errors: parser.errors().to_vec(),
    })
}

/// Split `html` into markup and, with `erb`, `<%...%>` placeholders.
///
/// An unterminated `<%` makes the rest of the input a placeholder.
fn segments(html: &str, erb: bool) -> Vec<Segment<'_>> {
    if !erb {
        return vec![Segment {
            text: html,
            placeholder: false,
        }];
    }

    let mut segments = Vec::new();
    let mut rest = html;
    while let Some(open) = rest.find("<%") {
        let (markup, tail) = rest.split_at(open);
        let close = tail.find("%>").map_or(tail.len(), |close| close + 2);
        let (placeholder, after) = tail.split_at(close);
        segments.push(Segment {
            text: markup,
            placeholder: false,
        });
        segments.push(Segment {
            text: placeholder,
            placeholder: true,
        });
        rest = after;
    }
    segments.push(Segment {
        text: rest,
        placeholder: false,
    });
    segments.retain(|segment| !segment.text.is_empty());
    segments
}

/// Cut `text` into pieces of about `size` bytes, never inside a character.
fn pieces(text: &str, size: Option<NonZeroUsize>) -> Vec<&str> {
    let Some(size) = size else {
        return vec![text];
    };
    let mut pieces = Vec::new();
    let mut start = 0;
    while start < text.len() {
        let mut end = (start + size.get()).min(text.len());
        while !text.is_char_boundary(end) {
            end += 1;
        }
        pieces.push(&text[start..end]);
        start = end;
    }
    pieces
}

fn print_report(report: &Report) {
    println!("{}", "=== Tokens ===".bold());
    for token in &report.tokens {
        println!(
            "  {:>4}:{:<4} {:<30} {:<24} {:?}",
            token.line_number,
            token.column_number,
            token.kind.to_string(),
            token.context.to_string().dimmed().to_string(),
            token.text
        );
    }

    println!("\n{}", "=== Final State ===".bold());
    println!("context:      {}", report.context);
    if let Some(ref name) = report.tag_name {
        let kind = match (report.is_closing_tag, report.is_self_closing_tag) {
            (true, _) => " (closing)",
            (false, true) => " (self-closing)",
            (false, false) => "",
        };
        println!("last tag:     {name}{kind}");
    }
    println!(
        "position:     {}:{} ({} characters)",
        report.line_number, report.column_number, report.document_length
    );

    if !report.errors.is_empty() {
        println!("\n{}", "=== Parse Issues ===".bold());
        for issue in &report.errors {
            println!("  - {}", issue.to_string().red());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tokens_only_filter() {
        let cli = Cli::try_parse_from([
            "tagscan",
            "tokens",
            "--html",
            "<a>",
            "--only",
            "tag_name",
            "--only",
            "tag_end",
        ])
        .unwrap();
        let Command::Tokens(args) = cli.command else {
            panic!("expected tokens subcommand");
        };
        assert_eq!(args.only, [TokenKind::TagName, TokenKind::TagEnd]);
        assert_eq!(args.input.html.as_deref(), Some("<a>"));
    }

    #[test]
    fn test_unknown_kind_is_rejected() {
        assert!(Cli::try_parse_from(["tagscan", "tokens", "--only", "bogus"]).is_err());
    }

    #[test]
    fn test_file_and_html_conflict() {
        assert!(Cli::try_parse_from(["tagscan", "parse", "a.html", "--html", "<a>"]).is_err());
    }

    #[test]
    fn test_parse_flags() {
        let cli = Cli::try_parse_from([
            "tagscan",
            "parse",
            "view.erb",
            "--erb",
            "--json",
            "--chunk-size",
            "8",
            "-q",
        ])
        .unwrap();
        let Command::Parse(args) = cli.command else {
            panic!("expected parse subcommand");
        };
        assert!(args.erb && args.json && args.quiet);
        assert_eq!(args.chunk_size.map(NonZeroUsize::get), Some(8));
        assert_eq!(args.input.path, Some(PathBuf::from("view.erb")));
    }

    #[test]
    fn test_zero_chunk_size_is_rejected() {
        assert!(Cli::try_parse_from(["tagscan", "parse", "--chunk-size", "0"]).is_err());
    }

    #[test]
    fn test_erb_segments() {
        let texts: Vec<(&str, bool)> = segments("a<%= x %>b<% y", true)
            .iter()
            .map(|segment| (segment.text, segment.placeholder))
            .collect();
        assert_eq!(
            texts,
            [("a", false), ("<%= x %>", true), ("b", false), ("<% y", true)]
        );
        assert_eq!(segments("a<%b%>", false).len(), 1);
    }

    #[test]
    fn test_pieces_stay_on_char_boundaries() {
        assert_eq!(pieces("aéb", NonZeroUsize::new(2)), ["aé", "b"]);
        assert_eq!(pieces("abc", None), ["abc"]);
    }

    #[test]
    fn test_scan_placeholder_and_chunks() {
        let report = scan(r#"<a href="<%= url %>">x</a>"#, true, NonZeroUsize::new(3)).unwrap();
        assert_eq!(report.context, ParserContext::None);
        assert!(report.errors.is_empty());
        assert_eq!(report.tag_name.as_deref(), Some("a"));
        assert!(report.is_closing_tag);
        assert!(report.tokens.iter().all(|token| !token.text.contains("<%")));
        let text: Vec<&str> = report
            .tokens
            .iter()
            .filter(|token| token.kind == TokenKind::Text)
            .map(|token| token.text.as_str())
            .collect();
        assert_eq!(text, ["x"]);
    }

    #[test]
    fn test_scan_reports_errors() {
        let report = scan("<div =>", false, None).unwrap();
        assert_eq!(report.errors.len(), 1);
        assert_eq!(report.errors[0].column_number, 5);
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["context"], "none");
        assert_eq!(json["tokens"][0]["kind"], "tag_start");
    }
}
