use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use newton::kernel::services::adapters::{build_runtime, load_config, LocalStorageGateway};
use newton::kernel::{menu_entries, ContextMenuScope, NavigatorCommand, WorkspaceTreeSession};
use newton::models::{is_markdown_file, NodeKind, TreeRow};

mod logging;

const HELP: &str = "\
commands:
  ls                          show the visible tree
  expand <path>               toggle a folder
  refresh [path]              re-read a folder (default: workspace root)
  new-note <folder> <name>    create a note
  new-folder <folder> <name>  create a folder
  rename <path> <name>        rename a note or folder
  rm <path>                   delete recursively
  open <path>                 activate a row; notes are printed
  menu [path]                 list context menu entries
  run <command-id> [path]     run a context menu command (starts a draft)
  commit <name>               commit the current draft
  cancel                      cancel the current draft
  quit";

fn main() -> io::Result<()> {
    let _logging = logging::init();

    let root = match std::env::args().nth(1) {
        Some(arg) => PathBuf::from(arg),
        None => std::env::current_dir()?,
    };
    let root = std::fs::canonicalize(&root).unwrap_or(root);

    let runtime = build_runtime()?;
    let gateway = Arc::new(LocalStorageGateway::with_picked_folder(root.clone()));
    let session = match runtime.block_on(WorkspaceTreeSession::open(
        gateway,
        root.clone(),
        load_config(),
    )) {
        Ok(session) => session,
        Err(err) => {
            eprintln!("cannot open {}: {err}", root.display());
            std::process::exit(1);
        }
    };

    println!("workspace: {}", root.display());
    println!("type `help` for commands");

    let stdin = io::stdin();
    let mut stdout = io::stdout();
    loop {
        print!("> ");
        stdout.flush()?;

        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 {
            break;
        }
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        if matches!(line, "quit" | "exit" | "q") {
            break;
        }

        let (command, rest) = split_word(line);
        let outcome = runtime.block_on(run_line(&session, &root, command, rest));
        if let Err(message) = outcome {
            println!("error: {message}");
        }
    }

    Ok(())
}

fn split_word(input: &str) -> (&str, &str) {
    let input = input.trim_start();
    match input.split_once(char::is_whitespace) {
        Some((word, rest)) => (word, rest.trim()),
        None => (input, ""),
    }
}

fn resolve(root: &Path, arg: &str) -> PathBuf {
    let path = Path::new(arg);
    if arg.is_empty() || arg == "." {
        root.to_path_buf()
    } else if path.is_absolute() {
        path.to_path_buf()
    } else {
        root.join(path)
    }
}

async fn run_line(
    session: &WorkspaceTreeSession,
    root: &Path,
    command: &str,
    rest: &str,
) -> Result<(), String> {
    match command {
        "help" | "?" => println!("{HELP}"),
        "ls" => print_rows(&session.rows().await),
        "expand" => session
            .expand(resolve(root, rest))
            .await
            .map_err(|e| e.to_string())?,
        "refresh" => session
            .refresh_folder(resolve(root, rest))
            .await
            .map_err(|e| e.to_string())?,
        "new-note" | "new-folder" => {
            let (folder, name) = split_word(rest);
            let folder = resolve(root, folder);
            let result = if command == "new-note" {
                session.create_note(folder, name).await
            } else {
                session.create_folder(folder, name).await
            };
            result.map_err(|e| e.to_string())?;
        }
        "rename" => {
            let (path, name) = split_word(rest);
            session
                .rename(resolve(root, path), name)
                .await
                .map_err(|e| e.to_string())?;
        }
        "rm" => session
            .delete_recursive(resolve(root, rest))
            .await
            .map_err(|e| e.to_string())?,
        "open" => {
            let opened = session
                .activate(resolve(root, rest))
                .await
                .map_err(|e| e.to_string())?;
            if let Some(note) = opened {
                if !is_markdown_file(&note) {
                    println!("(not a markdown file)");
                }
                let content = session.read_note(&note).await.map_err(|e| e.to_string())?;
                println!("{content}");
            }
        }
        "menu" => {
            let scope = if rest.is_empty() {
                ContextMenuScope::EmptyArea
            } else {
                let path = resolve(root, rest);
                let kind = session
                    .with_state(|s| s.tree.get_by_path(&path).map(|n| n.kind()))
                    .await
                    .ok_or_else(|| format!("{} is not in the tree", path.display()))?;
                ContextMenuScope::Node(kind)
            };
            for entry in menu_entries(scope) {
                let marker = if entry.destructive { " (!)" } else { "" };
                println!("  {:<12} {}{marker}", entry.command.id(), entry.label);
            }
        }
        "run" => {
            let (id, target) = split_word(rest);
            let command = NavigatorCommand::from_id(id).ok_or_else(|| format!("unknown command {id:?}"))?;
            let target = (!target.is_empty()).then(|| resolve(root, target));
            session
                .run_command(command, target)
                .await
                .map_err(|e| e.to_string())?;
            if let Some(draft) = session.draft().await {
                println!(
                    "editing {} (commit <name> / cancel)",
                    draft.provisional_path.display()
                );
            }
        }
        "commit" => session.commit_draft(rest).await.map_err(|e| e.to_string())?,
        "cancel" => session.cancel_draft().await.map_err(|e| e.to_string())?,
        other => return Err(format!("unknown command {other:?}, try `help`")),
    }
    Ok(())
}

fn print_rows(rows: &[TreeRow]) {
    if rows.is_empty() {
        println!("(empty)");
        return;
    }
    for row in rows {
        let indent = "  ".repeat(row.depth as usize);
        let marker = match row.kind {
            NodeKind::Directory if row.is_expanded => "v ",
            NodeKind::Directory => "> ",
            NodeKind::Note => "  ",
        };
        let draft = if row.is_draft { "  [editing]" } else { "" };
        println!("{indent}{marker}{}{draft}", row.name);
    }
}
