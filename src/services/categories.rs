// Copyright (c) 2025 Budgetbook.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Transaction categories. Names are normalized to lowercase at create and
//! modify, which makes the UNIQUE constraint case-insensitive without
//! leaning on a database collation.

use crate::error::{Error, ValidationErrors};
use crate::models::Category;
use log::{debug, info};
use rusqlite::{Connection, OptionalExtension, params};

pub fn create(
    conn: &Connection,
    name: &str,
    description: Option<&str>,
) -> Result<Category, Error> {
    if let Some(errors) = validate_name(name) {
        return Err(Error::Validation(errors));
    }
    let normalized = name.to_lowercase();
    conn.execute(
        "INSERT INTO categories(name, description) VALUES (?1, ?2)",
        params![normalized, description],
    )?;
    info!("created category '{}'", normalized);
    Ok(Category {
        id: conn.last_insert_rowid(),
        name: normalized,
        description: description.map(str::to_string),
    })
}

/// Partial update: `None` leaves the attribute unchanged. A new name passes
/// through the same normalization and emptiness check as create.
pub fn modify(
    conn: &Connection,
    category: &Category,
    new_name: Option<&str>,
    new_description: Option<&str>,
) -> Result<Category, Error> {
    let name = match new_name {
        Some(n) => {
            if let Some(errors) = validate_name(n) {
                return Err(Error::Validation(errors));
            }
            n.to_lowercase()
        }
        None => category.name.clone(),
    };
    let description = match new_description {
        Some(d) => Some(d.to_string()),
        None => category.description.clone(),
    };
    let updated = conn.execute(
        "UPDATE categories SET name=?1, description=?2 WHERE id=?3",
        params![name, description, category.id],
    )?;
    if updated == 0 {
        return Err(Error::NotFound);
    }
    debug!("updated category {} -> '{}'", category.id, name);
    Ok(Category {
        id: category.id,
        name,
        description,
    })
}

pub fn delete(conn: &Connection, category: &Category) -> Result<(), Error> {
    let deleted = conn.execute("DELETE FROM categories WHERE id=?1", params![category.id])?;
    if deleted == 0 {
        return Err(Error::NotFound);
    }
    info!("deleted category '{}'", category.name);
    Ok(())
}

pub fn find_by_id(conn: &Connection, id: i64) -> Result<Option<Category>, Error> {
    let category = conn
        .query_row(
            "SELECT id, name, description FROM categories WHERE id=?1",
            params![id],
            row_to_category,
        )
        .optional()?;
    Ok(category)
}

/// Case-insensitive substring match against stored (lowercase) names.
pub fn find_by_name_substring(conn: &Connection, text: &str) -> Result<Vec<Category>, Error> {
    let needle = format!("%{}%", text.to_lowercase());
    let mut stmt = conn
        .prepare("SELECT id, name, description FROM categories WHERE name LIKE ?1 ORDER BY name")?;
    let rows = stmt.query_map(params![needle], row_to_category)?;
    let mut out = Vec::new();
    for row in rows {
        out.push(row?);
    }
    Ok(out)
}

pub fn list_all(conn: &Connection) -> Result<Vec<Category>, Error> {
    let mut stmt = conn.prepare("SELECT id, name, description FROM categories ORDER BY name")?;
    let rows = stmt.query_map([], row_to_category)?;
    let mut out = Vec::new();
    for row in rows {
        out.push(row?);
    }
    Ok(out)
}

fn row_to_category(r: &rusqlite::Row<'_>) -> rusqlite::Result<Category> {
    Ok(Category {
        id: r.get(0)?,
        name: r.get(1)?,
        description: r.get(2)?,
    })
}

fn validate_name(name: &str) -> Option<ValidationErrors> {
    let mut errors = ValidationErrors::new();
    if name.is_empty() {
        errors.insert("category_name", "Category name is empty".into());
    }
    (!errors.is_empty()).then_some(errors)
}
