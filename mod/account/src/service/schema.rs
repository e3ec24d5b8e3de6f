use dealerdesk_sql::SQLStore;

use crate::service::AccountError;

/// Initialize the SQLite schema for all account resources.
pub fn init_schema(sql: &dyn SQLStore) -> Result<(), AccountError> {
    let statements = [
        // Users table: core identity
        "CREATE TABLE IF NOT EXISTS users (
            id TEXT PRIMARY KEY,
            email TEXT NOT NULL UNIQUE,
            is_active INTEGER NOT NULL DEFAULT 1,
            is_email_verified INTEGER NOT NULL DEFAULT 0,
            data TEXT NOT NULL,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL
        )",
        "CREATE INDEX IF NOT EXISTS idx_users_email ON users(email)",

        // Sessions table: JWT issuance records
        "CREATE TABLE IF NOT EXISTS sessions (
            id TEXT PRIMARY KEY,
            user_id TEXT NOT NULL,
            revoked INTEGER NOT NULL DEFAULT 0,
            data TEXT NOT NULL,
            issued_at TEXT NOT NULL,
            expires_at TEXT NOT NULL,
            FOREIGN KEY (user_id) REFERENCES users(id) ON DELETE CASCADE
        )",
        "CREATE INDEX IF NOT EXISTS idx_sessions_user ON sessions(user_id)",

        // Email send history: feeds the verification cooldown
        "CREATE TABLE IF NOT EXISTS email_notifications (
            id TEXT PRIMARY KEY,
            user_id TEXT NOT NULL,
            kind TEXT NOT NULL,
            data TEXT NOT NULL,
            created_at TEXT NOT NULL,
            FOREIGN KEY (user_id) REFERENCES users(id)
        )",
        "CREATE INDEX IF NOT EXISTS idx_email_notifications_user
             ON email_notifications(user_id, kind, created_at)",
    ];

    for stmt in &statements {
        sql.exec(stmt, &[])
            .map_err(|e| AccountError::Storage(e.to_string()))?;
    }

    Ok(())
}
