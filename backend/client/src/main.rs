use clap::Parser;
use client::{DEFAULT_API_URL, HttpNotesApi, NoteBoard, NotesApi, Submit};
use tokio::io::{AsyncBufReadExt, BufReader, stdin};
use tracing_subscriber::{EnvFilter, fmt};

const HELP: &str = "commands: title <text> | content <text> | add | delete <n|id> | list | refresh | help | quit";

#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    /// Notes collection URL.
    #[arg(long, env = "NOTES_API_URL", default_value = DEFAULT_API_URL)]
    api_url: String,
}

#[tokio::main]
async fn main() -> std::io::Result<()> {
    fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let mut board = NoteBoard::new(HttpNotesApi::new(args.api_url));

    board.mount().await;
    print!("{}", board.render());
    println!("{HELP}");

    let mut lines = BufReader::new(stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let (command, rest) = line
            .trim_start()
            .split_once(' ')
            .unwrap_or((line.trim(), ""));

        match command {
            "title" => board.set_title(rest),
            "content" => board.set_content(rest),
            "add" => match board.submit().await {
                Submit::Created => print!("{}", board.render()),
                Submit::Invalid => println!("title and content are required"),
                Submit::Failed => {}
            },
            "delete" => {
                if let Some(id) = resolve(&board, rest.trim()) {
                    board.delete(&id).await;
                    print!("{}", board.render());
                }
            }
            "list" => print!("{}", board.render()),
            "refresh" => {
                board.mount().await;
                print!("{}", board.render());
            }
            "quit" | "exit" => break,
            "" => {}
            _ => println!("{HELP}"),
        }
    }

    Ok(())
}

/// Accepts either the 1-based position shown by `list` or a raw id.
fn resolve<A: NotesApi>(board: &NoteBoard<A>, target: &str) -> Option<String> {
    if target.is_empty() {
        return None;
    }

    target
        .parse::<usize>()
        .ok()
        .and_then(|n| n.checked_sub(1))
        .and_then(|index| board.notes().get(index))
        .map(|note| note.id.clone())
        .or_else(|| Some(target.to_string()))
}
