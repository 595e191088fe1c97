//! Data models for notetree

mod note;
mod nullable;
mod user;

pub use note::{
    CreateNote, ListNotesParams, Note, NoteId, NoteStatus, NoteUpdated, ParentFilter,
    UpdateNote, UpdatePosition,
};
pub use user::{ChangePassword, Credentials, RegisterUser, UpdateProfile, User, UserId};
