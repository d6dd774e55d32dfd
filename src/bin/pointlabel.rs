//! Command-line interface for pointlabel
//!
//! Drives one editor session per invocation against a directory store, so
//! state carries over between commands the way it carries over between
//! page loads in a block editor.
//!
//! Usage:
//!   pointlabel show                                   - Print the workspace tree and corpus size
//!   pointlabel export [--external]                    - Print the grammar as canonical JSON
//!   pointlabel load `<grammar.json>`                  - Replace the workspace with a saved grammar
//!   pointlabel import `<table>` [--parent `<id>`] [--index `<n>`] - Import abbreviations as a choice
//!   pointlabel labels `<file>`                        - Replace the test corpus, one label per line
//!   pointlabel evaluate [--format json|yaml]          - Tokenize the corpus with the current grammar
//!   pointlabel highlight `<node-id>`                  - Show the block a token points at
//!   pointlabel reset                                  - Forget grammar, corpus and results

use clap::{Arg, ArgAction, ArgMatches, Command};
use std::path::PathBuf;

use pointlabel::config::{Loader, PointlabelConfig};
use pointlabel::persistence::FileStore;
use pointlabel::serializer::parse_table;
use pointlabel::tokenizer::LocalEvaluator;
use pointlabel::workspace::{Attachment, WorkspaceNode};
use pointlabel::{Editor, Mode, NodeId, TestCorpus, TokenizerClient};

type CliResult = Result<(), Box<dyn std::error::Error>>;

fn cli() -> Command {
    Command::new("pointlabel")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Build and test point-label grammars")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .arg(
            Arg::new("store")
                .long("store")
                .global(true)
                .help("Directory holding the saved editor state"),
        )
        .arg(
            Arg::new("config")
                .long("config")
                .global(true)
                .help("Configuration file layered over the defaults"),
        )
        .subcommand(Command::new("show").about("Print the workspace tree and corpus size"))
        .subcommand(
            Command::new("export")
                .about("Print the grammar as canonical JSON")
                .arg(
                    Arg::new("external")
                        .long("external")
                        .action(ArgAction::SetTrue)
                        .help("Emit the tokenizer form, without block flavors"),
                ),
        )
        .subcommand(
            Command::new("load")
                .about("Replace the workspace with a grammar file")
                .arg(
                    Arg::new("path")
                        .help("Canonical grammar JSON")
                        .required(true)
                        .index(1),
                ),
        )
        .subcommand(
            Command::new("import")
                .about("Import a pattern,type_name table as a choice block")
                .arg(
                    Arg::new("path")
                        .help("Two-column table, one abbreviation per line")
                        .required(true)
                        .index(1),
                )
                .arg(
                    Arg::new("parent")
                        .long("parent")
                        .help("Container to attach the choice to"),
                )
                .arg(
                    Arg::new("index")
                        .long("index")
                        .requires("parent")
                        .value_parser(clap::value_parser!(usize))
                        .help("Child slot within the parent (default: append)"),
                ),
        )
        .subcommand(
            Command::new("labels")
                .about("Replace the test corpus")
                .arg(
                    Arg::new("path")
                        .help("Point labels, one per line")
                        .required(true)
                        .index(1),
                ),
        )
        .subcommand(
            Command::new("evaluate")
                .about("Tokenize the corpus with the current grammar")
                .arg(
                    Arg::new("format")
                        .long("format")
                        .short('f')
                        .value_parser(["json", "yaml"])
                        .default_value("json")
                        .help("Output format"),
                ),
        )
        .subcommand(
            Command::new("highlight")
                .about("Show the block with the given id")
                .arg(Arg::new("id").help("Block id").required(true).index(1)),
        )
        .subcommand(Command::new("reset").about("Forget grammar, corpus and results"))
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let matches = cli().get_matches();

    let config = load_config(&matches).unwrap_or_else(|e| {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    });
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(&config.logging.level))
        .init();

    if let Err(e) = run(&matches, &config).await {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn load_config(matches: &ArgMatches) -> Result<PointlabelConfig, config::ConfigError> {
    let mut loader = match matches.get_one::<String>("config") {
        Some(path) => Loader::new().with_file(path),
        None => Loader::new().with_optional_file("pointlabel.toml"),
    }
    .with_environment();
    if let Some(store) = matches.get_one::<String>("store") {
        loader = loader.set_override("storage.directory", store.as_str())?;
    }
    loader.build()
}

async fn run(matches: &ArgMatches, config: &PointlabelConfig) -> CliResult {
    let mut editor = Editor::open(FileStore::new(&config.storage.directory));

    match matches.subcommand() {
        Some(("show", _)) => handle_show(&editor),
        Some(("export", export_matches)) => {
            let mode = if export_matches.get_flag("external") {
                Mode::External
            } else {
                Mode::Internal
            };
            println!("{}", editor.export(mode)?.to_json_pretty());
        }
        Some(("load", load_matches)) => {
            let text = read(load_matches)?;
            let root = editor.load_grammar(&text)?;
            println!("loaded grammar rooted at {}", root);
        }
        Some(("import", import_matches)) => {
            let pairs = parse_table(&read(import_matches)?)?;
            let at = import_matches.get_one::<String>("parent").map(|parent| {
                let parent = NodeId::new(parent.as_str());
                match import_matches.get_one::<usize>("index") {
                    Some(index) => Attachment::at(parent, *index),
                    None => Attachment::append(parent),
                }
            });
            let choice = editor.import_pairs(&pairs, at, &config.import.child_variant())?;
            println!("imported {} abbreviations as choice {}", pairs.len(), choice);
        }
        Some(("labels", labels_matches)) => {
            let corpus = TestCorpus::from_lines(&read(labels_matches)?);
            println!("{} point labels", corpus.len());
            editor.set_corpus(corpus);
        }
        Some(("evaluate", evaluate_matches)) => {
            let client =
                TokenizerClient::with_policy(LocalEvaluator, config.tokenizer.retry_policy());
            let results = editor.evaluate(&client).await?;
            let output = match evaluate_matches.get_one::<String>("format").map(String::as_str) {
                Some("yaml") => serde_yaml::to_string(&results)?,
                _ => serde_json::to_string_pretty(&results)?,
            };
            println!("{}", output);
        }
        Some(("highlight", highlight_matches)) => {
            let id = NodeId::new(required(highlight_matches, "id")?);
            let found = editor.highlight_node(&id, &mut |node: &WorkspaceNode| {
                println!("{}", describe(node));
            });
            if !found {
                println!("no block {}", id);
            }
        }
        Some(("reset", _)) => editor.reset(),
        _ => unreachable!(),
    }

    editor.close();
    Ok(())
}

fn handle_show(editor: &Editor<FileStore>) {
    let workspace = editor.workspace();
    if workspace.is_empty() {
        println!("(empty workspace)");
    }
    for (node, depth) in workspace.pre_order() {
        println!("{}{}", "  ".repeat(depth), describe(node));
    }
    println!("{} point labels", editor.corpus().len());
}

fn describe(node: &WorkspaceNode) -> String {
    let fields = match node.combinator.type_name() {
        Some(type_name) => match &node.combinator {
            pointlabel::Combinator::String { pattern, .. } => {
                format!(" s={:?} type_name={}", pattern, type_name)
            }
            pointlabel::Combinator::SubstringN { length, .. } => {
                format!(" length={} type_name={}", length, type_name)
            }
            _ => format!(" type_name={}", type_name),
        },
        None => String::new(),
    };
    format!("{} [{}] {}{}", node.kind(), node.ui_variant, node.id, fields)
}

fn required<'a>(matches: &'a ArgMatches, name: &str) -> Result<&'a str, String> {
    matches
        .get_one::<String>(name)
        .map(String::as_str)
        .ok_or_else(|| format!("missing argument `{}`", name))
}

fn read(matches: &ArgMatches) -> Result<String, Box<dyn std::error::Error>> {
    let path = PathBuf::from(required(matches, "path")?);
    std::fs::read_to_string(&path)
        .map_err(|e| format!("could not read {}: {}", path.display(), e).into())
}
