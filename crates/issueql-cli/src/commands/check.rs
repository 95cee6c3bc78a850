use std::path::PathBuf;

use issueql_lib::Project;

use super::query_loader::load_query;

pub struct CheckArgs {
    pub query_path: Option<PathBuf>,
    pub query_text: Option<String>,
    pub strict: bool,
    pub color: bool,
}

pub fn run(args: CheckArgs) {
    let (source, path) = load_query(args.query_path.as_deref(), args.query_text.as_deref())
        .unwrap_or_else(|msg| {
            eprintln!("error: {msg}");
            std::process::exit(1);
        });

    let mut project = Project::new();
    let id = project.open(source.clone());
    let diagnostics = project.diagnostics(id).expect("document just opened");

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

    let failed = if args.strict {
        diagnostics.has_errors() || diagnostics.has_warnings()
    } else {
        diagnostics.has_errors()
    };
    if failed {
        std::process::exit(1);
    }

    // Silent on success (like cargo check)
}
