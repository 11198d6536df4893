pub mod editor;
pub mod files;
pub mod login;
pub mod styles;

pub use editor::EditorScreen;
pub use files::FileListScreen;
pub use login::LoginScreen;
