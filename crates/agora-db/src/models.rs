/// Database row types that never leave this crate in full.
///
/// Outbound shapes live in agora-types; the only row kept here is the user
/// row, because it carries the password hash and the login path needs it.
pub struct UserRow {
    pub id: String,
    pub username: String,
    pub password: String,
    pub date_joined: String,
}
