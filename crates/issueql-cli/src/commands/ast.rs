use std::fmt::Write;
use std::path::PathBuf;

use issueql_lib::parser::{SyntaxKind, SyntaxNode, parse};

use super::query_loader::load_query;

pub struct AstArgs {
    pub query_path: Option<PathBuf>,
    pub query_text: Option<String>,
    pub spans: bool,
    pub color: bool,
}

pub fn run(args: AstArgs) {
    let (source, path) = load_query(args.query_path.as_deref(), args.query_text.as_deref())
        .unwrap_or_else(|msg| {
            eprintln!("error: {msg}");
            std::process::exit(1);
        });

    let (parsed, diagnostics) = parse(&source);
    print!("{}", dump_tree(&parsed.syntax(), args.spans));

    if !diagnostics.is_empty() {
        eprintln!(
            "{}",
            diagnostics
                .printer()
                .source(&source)
                .path(&path)
                .colored(args.color)
                .render()
        );
    }
    if diagnostics.has_errors() {
        std::process::exit(1);
    }
}

fn dump_tree(root: &SyntaxNode, spans: bool) -> String {
    let mut out = String::new();
    format_node(root, 0, spans, &mut out);
    out
}

fn format_node(node: &SyntaxNode, depth: usize, spans: bool, out: &mut String) {
    let indent = "  ".repeat(depth);
    let _ = write!(out, "{indent}{:?}", node.kind());
    if spans {
        let range = node.text_range();
        let _ = write!(out, " @ {}..{}", u32::from(range.start()), u32::from(range.end()));
    }
    out.push('\n');

    for child in node.children_with_tokens() {
        match child {
            rowan::NodeOrToken::Node(child) => format_node(&child, depth + 1, spans, out),
            rowan::NodeOrToken::Token(token) => {
                if token.kind() == SyntaxKind::Whitespace {
                    continue;
                }
                let indent = "  ".repeat(depth + 1);
                let _ = write!(out, "{indent}{:?} {:?}", token.kind(), token.text());
                if spans {
                    let range = token.text_range();
                    let _ =
                        write!(out, " @ {}..{}", u32::from(range.start()), u32::from(range.end()));
                }
                out.push('\n');
            }
        }
    }
}
