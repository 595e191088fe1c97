use std::path::Path;
use std::time::Duration;

use notetree_core::models::{CreateNote, UpdateNote};
use notetree_core::sync::SyncState;
use notetree_core::{NoteId, NoteTreeClient};

use crate::cli::NoteCommands;
use crate::commands::common::{
    build_client, format_note_detail, format_tree_lines, normalize_title, tree_params,
};
use crate::error::CliError;

const FILE_POLL_INTERVAL: Duration = Duration::from_millis(500);

pub async fn run_notes(command: NoteCommands, base_url: Option<&str>) -> Result<(), CliError> {
    let client = build_client(base_url, "/notes")?;
    let notes = client.notes();

    match command {
        NoteCommands::Tree {
            trashed,
            favorites,
            json,
        } => {
            let tree = notes.tree(&tree_params(trashed, favorites)).await?;
            if json {
                println!("{}", serde_json::to_string_pretty(&tree)?);
            } else if tree.is_empty() {
                println!("No notes.");
            } else {
                for line in format_tree_lines(&tree) {
                    println!("{line}");
                }
            }
        }
        NoteCommands::Show { id, json } => {
            let note = notes.get(NoteId(id)).await?;
            if json {
                println!("{}", serde_json::to_string_pretty(&note)?);
            } else {
                println!("{}", format_note_detail(&note));
            }
        }
        NoteCommands::Add {
            title,
            parent,
            content,
        } => {
            let note = notes
                .create(&CreateNote {
                    parent_id: parent.map(NoteId),
                    content,
                    ..CreateNote::titled(normalize_title(&title)?)
                })
                .await?;
            println!("Created note {}", note.id);
        }
        NoteCommands::Rename { id, title } => {
            let changes = UpdateNote {
                title: Some(normalize_title(&title)?),
                ..UpdateNote::default()
            };
            notes.update(NoteId(id), &changes).await?;
            println!("Renamed note {id}");
        }
        NoteCommands::Trash { id } => {
            notes.trash(NoteId(id)).await?;
            println!("Moved note {id} to trash");
        }
        NoteCommands::Restore { id } => {
            notes.restore(NoteId(id)).await?;
            println!("Restored note {id}");
        }
        NoteCommands::Delete { id } => {
            notes.delete(NoteId(id)).await?;
            println!("Deleted note {id}");
        }
        NoteCommands::Favorite { id } => {
            notes.toggle_favorite(NoteId(id)).await?;
            println!("Toggled favorite on note {id}");
        }
        NoteCommands::Move { id, position } => {
            notes.update_position(NoteId(id), position).await?;
            println!("Moved note {id} to position {position}");
        }
        NoteCommands::Watch { id, file } => run_watch(&client, NoteId(id), &file).await?,
    }
    Ok(())
}

/// Mirror a note into `file` and sync edits of the file back until Ctrl-C.
async fn run_watch(client: &NoteTreeClient, id: NoteId, file: &Path) -> Result<(), CliError> {
    let note = client.notes().get(id).await?;
    tokio::fs::write(file, &note.content).await?;

    let scheduler = client.sync_scheduler();
    scheduler.open(&note);
    let task = scheduler.start();
    println!(
        "Editing note {} in {}; changes sync every {:?}. Press Ctrl-C to stop.",
        id,
        file.display(),
        scheduler.interval()
    );

    let mut last_seen = note.content;
    let mut last_state = scheduler.state();
    let mut poll = tokio::time::interval(FILE_POLL_INTERVAL);
    let shutdown = tokio::signal::ctrl_c();
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            _ = &mut shutdown => break,
            _ = poll.tick() => {
                match tokio::fs::read_to_string(file).await {
                    Ok(content) => {
                        if let Some(changed) = take_change(&mut last_seen, content) {
                            scheduler.edit(changed);
                        }
                    }
                    Err(error) => tracing::warn!("Failed to read {}: {}", file.display(), error),
                }

                let state = scheduler.state();
                if state != last_state {
                    if let Some(state) = state {
                        print_state(state);
                    }
                    last_state = state;
                }
            }
        }
    }

    task.stop();
    if let Some(discarded) = scheduler.close() {
        eprintln!(
            "Stopped with unsynced edits to note {}; they remain in {}",
            discarded.id,
            file.display()
        );
    }
    Ok(())
}

/// Returns the new content when it differs from what was last seen.
pub fn take_change(last_seen: &mut String, current: String) -> Option<String> {
    if *last_seen == current {
        return None;
    }
    last_seen.clone_from(&current);
    Some(current)
}

fn print_state(state: SyncState) {
    println!("[{}]", state.label());
}
