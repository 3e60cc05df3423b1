//! Alias and column naming policy
//!
//! Generated column names end up in dashboards and saved queries, so the
//! suffix rules here are part of the output contract.

use crate::semantic::model::{Relationship, Table};
use lazy_static::lazy_static;
use regex::Regex;

const ALPHABET: &[u8; 26] = b"abcdefghijklmnopqrstuvwxyz";

lazy_static! {
    static ref ID_SUFFIX: Regex = Regex::new(r"(?i)_id$").unwrap();
    static ref CODE_SUFFIX: Regex = Regex::new(r"(?i)_code$").unwrap();
    static ref AIRPORT_SUFFIX: Regex = Regex::new(r"(?i)airport$").unwrap();
}

/// Hands out table aliases for a single compile call.
///
/// `a` through `z` first. After that each letter is followed by the
/// number of completed passes (`a1` .. `z1`, `a2`, ...), which never spells
/// a two-letter keyword like `AS` or `ON`.
#[derive(Debug, Default)]
pub struct AliasAllocator {
    next: usize,
}

impl AliasAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn next_alias(&mut self) -> String {
        let index = self.next;
        self.next += 1;
        alias_for_index(index)
    }

    pub fn allocated(&self) -> usize {
        self.next
    }
}

pub fn alias_for_index(index: usize) -> String {
    let letter = ALPHABET[index % ALPHABET.len()] as char;
    let pass = index / ALPHABET.len();
    if pass == 0 {
        letter.to_string()
    } else {
        format!("{}{}", letter, pass)
    }
}

/// Readable form of a foreign-key column: `user_id` -> `user`,
/// `carrier_code` -> `carrier`, `origin_airport` -> `origin_`.
///
/// The three strips run in sequence, each anchored at the end.
pub fn join_key_name(from_field: &str) -> String {
    let without_id = ID_SUFFIX.replace(from_field, "");
    let without_code = CODE_SUFFIX.replace(&without_id, "");
    AIRPORT_SUFFIX.replace(&without_code, "").into_owned()
}

pub fn base_column_alias(table: &Table, field: &str) -> String {
    format!("{}_{}", table.clean_name(), field)
}

pub fn joined_column_alias(
    from_table: &Table,
    relationship: &Relationship,
    to_table: &Table,
    field: &str,
) -> String {
    format!(
        "{}_{}_{}_{}",
        from_table.clean_name(),
        join_key_name(&relationship.from_field),
        to_table.clean_name(),
        field
    )
}
