use reqwest::Method;

use super::with_query;
use crate::error::Result;
use crate::models::{CreateNote, ListNotesParams, Note, NoteId, NoteUpdated, UpdateNote, UpdatePosition};
use crate::transport::{RequestOptions, Transport};
use crate::tree::{build_tree, TreeNode, TreeOptions};

const NOTES_PATH: &str = "/v1/notes";

/// Client for `/v1/notes`
#[derive(Clone)]
pub struct NotesClient {
    transport: Transport,
}

impl NotesClient {
    pub const fn new(transport: Transport) -> Self {
        Self { transport }
    }

    pub async fn create(&self, note: &CreateNote) -> Result<Note> {
        self.transport
            .request_json(Method::POST, NOTES_PATH, RequestOptions::json(note)?)
            .await
    }

    pub async fn get(&self, id: NoteId) -> Result<Note> {
        self.transport
            .request_json(Method::GET, &note_path(id), RequestOptions::new())
            .await
    }

    /// List notes matching the supplied filters.
    pub async fn list(&self, params: &ListNotesParams) -> Result<Vec<Note>> {
        let path = with_query(NOTES_PATH, &params.query_pairs());
        let notes: Option<Vec<Note>> = self
            .transport
            .request_json(Method::GET, &path, RequestOptions::new())
            .await?;
        Ok(notes.unwrap_or_default())
    }

    pub async fn list_all(&self) -> Result<Vec<Note>> {
        self.list(&ListNotesParams::default()).await
    }

    /// Fetch a listing and nest it by parent, siblings ordered by position.
    pub async fn tree(&self, params: &ListNotesParams) -> Result<Vec<TreeNode<Note>>> {
        let notes = self.list(params).await?;
        tracing::debug!("Building tree from {} notes", notes.len());
        Ok(build_tree(&notes, &TreeOptions::notes_by_position()))
    }

    pub async fn update(&self, id: NoteId, changes: &UpdateNote) -> Result<NoteUpdated> {
        self.transport
            .request_json(Method::PUT, &note_path(id), RequestOptions::json(changes)?)
            .await
    }

    pub async fn delete(&self, id: NoteId) -> Result<()> {
        self.transport
            .request_unit(Method::DELETE, &note_path(id), RequestOptions::new())
            .await
    }

    pub async fn trash(&self, id: NoteId) -> Result<()> {
        self.put_action(id, "trash").await
    }

    pub async fn restore(&self, id: NoteId) -> Result<()> {
        self.put_action(id, "restore").await
    }

    pub async fn toggle_favorite(&self, id: NoteId) -> Result<()> {
        self.put_action(id, "favorite").await
    }

    pub async fn update_position(&self, id: NoteId, position: i64) -> Result<()> {
        self.transport
            .request_unit(
                Method::PUT,
                &format!("{}/position", note_path(id)),
                RequestOptions::json(&UpdatePosition { position })?,
            )
            .await
    }

    async fn put_action(&self, id: NoteId, action: &str) -> Result<()> {
        self.transport
            .request_unit(
                Method::PUT,
                &format!("{}/{action}", note_path(id)),
                RequestOptions::new(),
            )
            .await
    }
}

fn note_path(id: NoteId) -> String {
    format!("{NOTES_PATH}/{id}")
}
