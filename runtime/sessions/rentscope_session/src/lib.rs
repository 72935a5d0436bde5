/*!
Client-side session management for Rentscope.

# Anatomy of a session

A session is made of three independent pieces of state:

- The **token**, a bearer credential issued by the backend at login time.
  Its presence is what "being logged in" means.
- The **user**, a cached copy of the user object returned alongside the token.
- The **role override**, a transient elevation marker. It is attached to outgoing
  requests as `X-User-Role` but it never touches the cached user.

The session doesn't own any in-memory state: every read goes to the
[`KeyValueStore`](rentscope_storage::KeyValueStore) and every mutation is written
through before returning. Two [`Session`]s built on top of the same store always
agree with each other.
*/
mod session_;
mod user;

pub use session_::{Session, SessionSnapshot};
pub use user::User;

pub mod errors {
    //! Errors that can occur when reading or mutating the session.
    pub use crate::session_::errors::*;
}
