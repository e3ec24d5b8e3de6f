mod notification;
mod session;
mod user;

pub use notification::{EmailNotification, NotificationKind};
pub use session::{Claims, Session, TokenPair};
pub use user::{
    ChangeEmail, ChangePassword, CreateAccount, Credentials, ResetConfirm, ResetRequest,
    UpdateProfile, User,
};
