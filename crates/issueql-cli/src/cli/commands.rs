//! Command builders for the CLI.

use clap::Command;

use super::args::*;

/// Build the complete CLI with all subcommands.
pub fn build_cli() -> Command {
    Command::new("issueql")
        .about("Search query documents for GitHub issues and pull requests")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .subcommand(check_command())
        .subcommand(ast_command())
        .subcommand(compile_command())
}

fn check_command() -> Command {
    Command::new("check")
        .about("Parse and validate a query document")
        .arg(query_path_arg())
        .arg(query_text_arg())
        .arg(strict_arg())
        .arg(color_arg())
        .after_help(
            r#"EXAMPLES:
  issueql check queries.iql             # validate a document
  issueql check -q 'is:open label:bug'  # validate inline text
  issueql check - < queries.iql         # validate stdin
  issueql check queries.iql --strict    # warnings fail too"#,
        )
}

fn ast_command() -> Command {
    Command::new("ast")
        .about("Show the syntax tree of a query document")
        .arg(query_path_arg())
        .arg(query_text_arg())
        .arg(spans_arg())
        .arg(color_arg())
        .after_help(
            r#"EXAMPLES:
  issueql ast queries.iql               # syntax tree
  issueql ast -q 'comments:>5' --spans  # tree with source positions"#,
        )
}

fn compile_command() -> Command {
    Command::new("compile")
        .about("Compile a query document into search API request parameters")
        .arg(query_path_arg())
        .arg(query_text_arg())
        .arg(compact_arg())
        .arg(color_arg())
        .after_help(
            r#"EXAMPLES:
  issueql compile queries.iql                     # one request per query line
  issueql compile -q 'is:open sort:created-asc'   # inline
  issueql compile queries.iql --compact | jq .    # machine-readable"#,
        )
}
