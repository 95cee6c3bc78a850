use std::path::PathBuf;

use issueql_lib::Project;

use super::query_loader::load_query;

pub struct CompileArgs {
    pub query_path: Option<PathBuf>,
    pub query_text: Option<String>,
    pub compact: bool,
    pub color: bool,
}

pub fn run(args: CompileArgs) {
    let (source, path) = load_query(args.query_path.as_deref(), args.query_text.as_deref())
        .unwrap_or_else(|msg| {
            eprintln!("error: {msg}");
            std::process::exit(1);
        });

    let mut project = Project::new();
    let id = project.open(source.clone());
    let diagnostics = project.diagnostics(id).expect("document just opened");

    if diagnostics.has_errors() {
        eprintln!(
            "{}",
            diagnostics
                .printer()
                .source(&source)
                .path(&path)
                .colored(args.color)
                .render()
        );
        std::process::exit(1);
    }

    let (queries, _) = project.compile(id).expect("document just opened");
    let json = if args.compact {
        serde_json::to_string(&queries)
    } else {
        serde_json::to_string_pretty(&queries)
    };
    match json {
        Ok(json) => println!("{json}"),
        Err(e) => {
            eprintln!("error: failed to serialize output: {e}");
            std::process::exit(1);
        }
    }
}
