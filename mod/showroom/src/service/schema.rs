use dealerdesk_sql::SQLStore;

use dealerdesk_core::ServiceError;

/// Initialize the SQLite schema for all showroom resources.
///
/// Every table carries the full record as JSON in `data` plus the
/// columns that lookups, tenancy filters and aggregates need. Slugs are
/// UNIQUE; creators retry with a fresh suffix on collision.
pub fn init_schema(sql: &dyn SQLStore) -> Result<(), ServiceError> {
    let statements = [
        "CREATE TABLE IF NOT EXISTS showrooms (
            id TEXT PRIMARY KEY,
            slug TEXT NOT NULL UNIQUE,
            owner_id TEXT NOT NULL,
            title TEXT NOT NULL,
            data TEXT NOT NULL,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL
        )",
        "CREATE INDEX IF NOT EXISTS idx_showrooms_owner ON showrooms(owner_id)",

        "CREATE TABLE IF NOT EXISTS employees (
            id TEXT PRIMARY KEY,
            slug TEXT NOT NULL UNIQUE,
            showroom_id TEXT NOT NULL,
            last_name TEXT NOT NULL,
            is_restricted INTEGER NOT NULL DEFAULT 0,
            data TEXT NOT NULL,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL,
            FOREIGN KEY (showroom_id) REFERENCES showrooms(id)
        )",
        "CREATE INDEX IF NOT EXISTS idx_employees_showroom ON employees(showroom_id)",

        "CREATE TABLE IF NOT EXISTS categories (
            id TEXT PRIMARY KEY,
            slug TEXT NOT NULL UNIQUE,
            showroom_id TEXT NOT NULL,
            name TEXT NOT NULL,
            data TEXT NOT NULL,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL,
            UNIQUE (showroom_id, name),
            FOREIGN KEY (showroom_id) REFERENCES showrooms(id)
        )",
        "CREATE INDEX IF NOT EXISTS idx_categories_showroom ON categories(showroom_id)",

        "CREATE TABLE IF NOT EXISTS products (
            id TEXT PRIMARY KEY,
            slug TEXT NOT NULL UNIQUE,
            showroom_id TEXT NOT NULL,
            category_id TEXT NOT NULL,
            title TEXT NOT NULL,
            price INTEGER NOT NULL,
            quantity INTEGER NOT NULL DEFAULT 0,
            data TEXT NOT NULL,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL,
            FOREIGN KEY (showroom_id) REFERENCES showrooms(id),
            FOREIGN KEY (category_id) REFERENCES categories(id)
        )",
        "CREATE INDEX IF NOT EXISTS idx_products_showroom ON products(showroom_id)",
        "CREATE INDEX IF NOT EXISTS idx_products_category ON products(category_id)",

        "CREATE TABLE IF NOT EXISTS sales (
            id TEXT PRIMARY KEY,
            slug TEXT NOT NULL UNIQUE,
            showroom_id TEXT NOT NULL,
            employee_id TEXT,
            data TEXT NOT NULL,
            created_at TEXT NOT NULL,
            FOREIGN KEY (showroom_id) REFERENCES showrooms(id)
        )",
        "CREATE INDEX IF NOT EXISTS idx_sales_showroom ON sales(showroom_id)",
        "CREATE INDEX IF NOT EXISTS idx_sales_employee ON sales(employee_id)",

        "CREATE TABLE IF NOT EXISTS sale_items (
            id TEXT PRIMARY KEY,
            slug TEXT NOT NULL UNIQUE,
            sale_id TEXT NOT NULL,
            product_id TEXT NOT NULL,
            quantity INTEGER NOT NULL,
            sale_price INTEGER NOT NULL,
            data TEXT NOT NULL,
            created_at TEXT NOT NULL,
            FOREIGN KEY (sale_id) REFERENCES sales(id)
        )",
        "CREATE INDEX IF NOT EXISTS idx_sale_items_sale ON sale_items(sale_id)",
        "CREATE INDEX IF NOT EXISTS idx_sale_items_product ON sale_items(product_id)",

        "CREATE TABLE IF NOT EXISTS supplies (
            id TEXT PRIMARY KEY,
            slug TEXT NOT NULL UNIQUE,
            showroom_id TEXT NOT NULL,
            dealer_id TEXT NOT NULL,
            data TEXT NOT NULL,
            created_at TEXT NOT NULL,
            FOREIGN KEY (showroom_id) REFERENCES showrooms(id),
            FOREIGN KEY (dealer_id) REFERENCES dealers(id)
        )",
        "CREATE INDEX IF NOT EXISTS idx_supplies_showroom ON supplies(showroom_id)",
        "CREATE INDEX IF NOT EXISTS idx_supplies_dealer ON supplies(dealer_id)",

        "CREATE TABLE IF NOT EXISTS supply_items (
            id TEXT PRIMARY KEY,
            slug TEXT NOT NULL UNIQUE,
            supply_id TEXT NOT NULL,
            product_id TEXT NOT NULL,
            quantity INTEGER NOT NULL,
            supply_price INTEGER NOT NULL,
            data TEXT NOT NULL,
            created_at TEXT NOT NULL,
            FOREIGN KEY (supply_id) REFERENCES supplies(id)
        )",
        "CREATE INDEX IF NOT EXISTS idx_supply_items_supply ON supply_items(supply_id)",
        "CREATE INDEX IF NOT EXISTS idx_supply_items_product ON supply_items(product_id)",

        "CREATE TABLE IF NOT EXISTS dealers (
            id TEXT PRIMARY KEY,
            slug TEXT NOT NULL UNIQUE,
            showroom_id TEXT NOT NULL,
            name TEXT NOT NULL,
            is_active INTEGER NOT NULL DEFAULT 1,
            data TEXT NOT NULL,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL,
            UNIQUE (showroom_id, name),
            FOREIGN KEY (showroom_id) REFERENCES showrooms(id)
        )",
        "CREATE INDEX IF NOT EXISTS idx_dealers_showroom ON dealers(showroom_id)",
    ];

    for stmt in &statements {
        sql.exec(stmt, &[])
            .map_err(|e| ServiceError::Storage(e.to_string()))?;
    }

    Ok(())
}
