//! Ordering maintainer: keeps `displayOrder` a dense rank within each scope.
//!
//! Every function here runs against a connection that is already inside a
//! transaction (see [`Database::transaction`](crate::database::Database::transaction)),
//! so a structural change — shift plus insert, shift plus promote, full
//! renumber — commits or rolls back as one unit.
//!
//! Scopes with gaps (left behind by folder moves) are legal input: listing
//! order is read via sort, not index arithmetic, and every operation below
//! preserves relative order regardless of gaps.

use rusqlite::{params, Connection};

use crate::database::{get_memo, row_to_memo, scope_memos, DatabaseResult};
use crate::models::{Memo, Scope};

/// Add `delta` to every rank in the scope.
pub fn shift(conn: &Connection, scope: &Scope, delta: i64) -> DatabaseResult<()> {
    match scope {
        Scope::History => {
            conn.execute(
                "UPDATE memos SET displayOrder = displayOrder + ?1 WHERE isTemplate = 0",
                [delta],
            )?;
        }
        Scope::Templates(folder) => {
            conn.execute(
                "UPDATE memos SET displayOrder = displayOrder + ?1
                 WHERE isTemplate = 1 AND folder IS ?2",
                params![delta, folder.as_deref()],
            )?;
        }
    }
    Ok(())
}

/// Insert one record at the top of a scope: shift everything by +1, insert
/// at rank 0. Returns the new id.
pub fn insert_top(
    conn: &Connection,
    scope: &Scope,
    content: &str,
    created_at: i64,
) -> DatabaseResult<i64> {
    shift(conn, scope, 1)?;
    insert_at_rank(conn, scope, content, created_at, 0)
}

/// Insert a batch at the top of a scope. Item `i` gets rank `n-1-i`, which
/// is equivalent to inserting the items one by one at the top, so their
/// relative order matches sequential capture.
pub fn insert_batch_top(
    conn: &Connection,
    scope: &Scope,
    contents: &[&str],
    created_at: i64,
) -> DatabaseResult<Vec<i64>> {
    let n = contents.len() as i64;
    if n == 0 {
        return Ok(Vec::new());
    }
    shift(conn, scope, n)?;
    let mut ids = Vec::with_capacity(contents.len());
    for (i, content) in contents.iter().enumerate() {
        ids.push(insert_at_rank(conn, scope, content, created_at, n - 1 - i as i64)?);
    }
    Ok(ids)
}

fn insert_at_rank(
    conn: &Connection,
    scope: &Scope,
    content: &str,
    created_at: i64,
    rank: i64,
) -> DatabaseResult<i64> {
    let (is_template, folder) = match scope {
        Scope::History => (0i64, None),
        Scope::Templates(folder) => (1i64, folder.as_deref()),
    };
    conn.execute(
        "INSERT INTO memos (content, createdAt, isTemplate, folder, displayOrder)
         VALUES (?1, ?2, ?3, ?4, ?5)",
        params![content, created_at, is_template, folder, rank],
    )?;
    Ok(conn.last_insert_rowid())
}

/// Promote an existing record to rank 0 and refresh its timestamp. Only the
/// records that were above it shift down by one, so a dense scope stays
/// dense no matter where the promoted record sat.
pub fn move_to_top(conn: &Connection, scope: &Scope, id: i64, now: i64) -> DatabaseResult<()> {
    let old_rank = match get_memo(conn, id)? {
        Some(memo) => memo.display_order,
        None => return Ok(()),
    };
    match scope {
        Scope::History => {
            conn.execute(
                "UPDATE memos SET displayOrder = displayOrder + 1
                 WHERE isTemplate = 0 AND displayOrder < ?1",
                [old_rank],
            )?;
        }
        Scope::Templates(folder) => {
            conn.execute(
                "UPDATE memos SET displayOrder = displayOrder + 1
                 WHERE isTemplate = 1 AND folder IS ?1 AND displayOrder < ?2",
                params![folder.as_deref(), old_rank],
            )?;
        }
    }
    conn.execute(
        "UPDATE memos SET displayOrder = 0, createdAt = ?1 WHERE id = ?2",
        params![now, id],
    )?;
    Ok(())
}

/// Commit a drag reorder: each id in `ordered_ids` gets its list index as
/// its rank, 0-based and dense.
pub fn assign_ranks(conn: &Connection, ordered_ids: &[i64]) -> DatabaseResult<()> {
    let mut stmt = conn.prepare("UPDATE memos SET displayOrder = ?1 WHERE id = ?2")?;
    for (rank, id) in ordered_ids.iter().enumerate() {
        stmt.execute(params![rank as i64, id])?;
    }
    Ok(())
}

/// Exact duplicate lookup within a scope: same content, same folder bucket,
/// case-sensitive. Ids in `exclude` (e.g. the records being moved) are
/// ignored. Returns the first match.
pub fn find_duplicate(
    conn: &Connection,
    scope: &Scope,
    content: &str,
    exclude: &[i64],
) -> DatabaseResult<Option<Memo>> {
    let memos = match scope {
        Scope::History => {
            let mut stmt = conn.prepare(
                "SELECT id, content, createdAt, isTemplate, folder, displayOrder
                 FROM memos WHERE isTemplate = 0 AND content = ?1",
            )?;
            let rows = stmt
                .query_map([content], row_to_memo)?
                .collect::<Result<Vec<_>, _>>()?;
            rows
        }
        Scope::Templates(folder) => {
            let mut stmt = conn.prepare(
                "SELECT id, content, createdAt, isTemplate, folder, displayOrder
                 FROM memos WHERE isTemplate = 1 AND folder IS ?1 AND content = ?2",
            )?;
            let rows = stmt
                .query_map(params![folder.as_deref(), content], row_to_memo)?
                .collect::<Result<Vec<_>, _>>()?;
            rows
        }
    };
    Ok(memos.into_iter().find(|m| !exclude.contains(&m.id)))
}

/// Backfill ranks for a scope whose rows were created before manual
/// ordering existed (every rank still zero): renumber by recency, newest
/// first. Scopes that already carry ranks are left alone. Returns whether a
/// renumber happened.
pub fn backfill_ranks(conn: &Connection, scope: &Scope) -> DatabaseResult<bool> {
    let memos = scope_memos(conn, scope)?;
    if memos.len() < 2 || memos.iter().any(|m| m.display_order != 0) {
        return Ok(false);
    }
    let mut by_recency = memos;
    by_recency.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    let ids: Vec<i64> = by_recency.iter().map(|m| m.id).collect();
    assign_ranks(conn, &ids)?;
    Ok(true)
}

/// Every scope currently present in the table (history plus each template
/// folder bucket, including the ungrouped one).
pub fn all_scopes(conn: &Connection) -> DatabaseResult<Vec<Scope>> {
    let mut scopes = vec![Scope::History];
    let mut stmt = conn.prepare(
        "SELECT DISTINCT folder FROM memos WHERE isTemplate = 1 ORDER BY folder",
    )?;
    let folders = stmt
        .query_map([], |row| row.get::<_, Option<String>>(0))?
        .collect::<Result<Vec<_>, _>>()?;
    scopes.extend(folders.into_iter().map(Scope::Templates));
    Ok(scopes)
}
