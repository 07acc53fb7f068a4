//! Page objects
//!
//! Each page borrows a [`Script`](crate::script::Script) and appends the steps
//! for one user-level operation. Nothing runs until the script is handed to an
//! executor.

pub mod base;
mod board;
mod card_detail;
mod home;
mod login;

pub use board::BoardPage;
pub use card_detail::CardDetailPage;
pub use home::HomePage;
pub use login::LoginPage;
