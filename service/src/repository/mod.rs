pub mod accounts;
pub mod comments;
pub mod follows;
pub mod likes;
pub mod videos;
