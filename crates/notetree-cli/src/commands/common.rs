use std::sync::Arc;

use notetree_core::models::{ListNotesParams, NoteStatus};
use notetree_core::transport::Payload;
use notetree_core::tree::walk_forest;
use notetree_core::{Note, NoteTreeClient, TreeNode};

use crate::config_file::load_client_config;
use crate::error::CliError;
use crate::navigator::TerminalNavigator;
use crate::store::KeyringStore;

const UNTITLED: &str = "(untitled)";

/// Client over the keychain store, as seen from the view at `current_path`.
pub fn build_client(base_url: Option<&str>, current_path: &str) -> Result<NoteTreeClient, CliError> {
    let config = load_client_config(base_url)?;
    let navigator = TerminalNavigator::new(current_path, config.login_path.clone());
    Ok(NoteTreeClient::new(
        config,
        Arc::new(KeyringStore::default()),
        Arc::new(navigator),
    )?)
}

pub fn tree_params(trashed: bool, favorites: bool) -> ListNotesParams {
    ListNotesParams {
        parent: None,
        status: Some(if trashed {
            NoteStatus::Trashed
        } else {
            NoteStatus::Normal
        }),
        favorite: favorites.then_some(true),
    }
}

pub fn normalize_title(title: &str) -> Result<String, CliError> {
    let title = title.trim();
    if title.is_empty() {
        Err(CliError::EmptyTitle)
    } else {
        Ok(title.to_string())
    }
}

pub fn display_title(note: &Note) -> &str {
    let title = note.title.trim();
    if title.is_empty() {
        UNTITLED
    } else {
        title
    }
}

/// One line per note, indented two spaces per level.
pub fn format_tree_lines(tree: &[TreeNode<Note>]) -> Vec<String> {
    walk_forest(tree)
        .map(|(depth, note)| {
            let favorite = if note.is_favorited() { " *" } else { "" };
            format!(
                "{}{}  [{}]{}",
                "  ".repeat(depth),
                display_title(note),
                note.id,
                favorite
            )
        })
        .collect()
}

pub fn format_note_detail(note: &Note) -> String {
    let mut lines = vec![
        format!("#{} {}", note.id, display_title(note)),
        format!(
            "parent: {}",
            note.parent_id
                .map_or_else(|| "(top level)".to_string(), |id| id.to_string())
        ),
        format!("position: {}", note.position),
        format!("favorite: {}", if note.is_favorited() { "yes" } else { "no" }),
        format!("status: {}", if note.is_trashed() { "trashed" } else { "normal" }),
        format!("created: {}", note.created_at),
    ];
    if let Some(updated_at) = &note.updated_at {
        lines.push(format!("updated: {updated_at}"));
    }
    if !note.content.is_empty() {
        lines.push(String::new());
        lines.push(note.content.clone());
    }
    lines.join("\n")
}

/// Human-readable rendering of a raw response.
pub fn describe_payload(payload: &Payload) -> Result<String, CliError> {
    Ok(match payload {
        Payload::Empty => "(no content)".to_string(),
        Payload::Text(text) => text.clone(),
        Payload::Json(value) => serde_json::to_string_pretty(value)?,
        Payload::File(file) => match &file.saved_to {
            Some(path) => format!(
                "Saved {} ({} bytes) to {}",
                file.filename,
                file.bytes.len(),
                path.display()
            ),
            None => format!(
                "Received {} ({}, {} bytes); set NOTETREE_DOWNLOAD_DIR to save downloads",
                file.filename,
                file.content_type,
                file.bytes.len()
            ),
        },
        Payload::Unsupported { content_type, body } => {
            format!("Unsupported content type {content_type} ({} bytes)", body.len())
        }
    })
}
