//! Deterministic display aliases ("hunter names").
//!
//! The alias table is the fixed numbered sequence `ハンター1 … ハンター9999`.
//! A user id is reduced to a 32-bit seed with the classic `h * 31 + c`
//! string hash over UTF-16 code units, and the seed picks a table entry.
//! Same id, same alias, on every device and every release.

/// Common prefix of every alias.
pub const ALIAS_PREFIX: &str = "ハンター";

/// Number of entries in the alias table.
pub const NAME_TABLE_LEN: u32 = 9999;

/// 32-bit wrapping `h = h * 31 + c` over UTF-16 code units.
pub fn seed_hash(input: &str) -> i32 {
    input.encode_utf16().fold(0i32, |h, unit| {
        h.wrapping_shl(5).wrapping_sub(h).wrapping_add(unit as i32)
    })
}

/// Table index selected by `user_id`, in `0..NAME_TABLE_LEN`.
pub fn name_index(user_id: &str) -> u32 {
    // |i32::MIN| does not fit in i32; widen first.
    ((seed_hash(user_id) as i64).unsigned_abs() % NAME_TABLE_LEN as u64) as u32
}

/// Table entry at `index`.
pub fn name_at(index: u32) -> String {
    format!("{}{}", ALIAS_PREFIX, index % NAME_TABLE_LEN + 1)
}

/// Alias for `user_id`. Pure.
pub fn hunter_name(user_id: &str) -> String {
    name_at(name_index(user_id))
}

/// Whether `name` is some entry of the alias table.
pub fn is_table_name(name: &str) -> bool {
    let number = match name.strip_prefix(ALIAS_PREFIX) {
        Some(n) => n,
        None => return false,
    };
    if number.is_empty() || number.starts_with('0') || !number.bytes().all(|b| b.is_ascii_digit()) {
        return false;
    }
    matches!(number.parse::<u32>(), Ok(n) if (1..=NAME_TABLE_LEN).contains(&n))
}

/// Whether `name` is exactly the alias `user_id` should carry.
pub fn is_alias_for(user_id: &str, name: &str) -> bool {
    is_table_name(name) && name == hunter_name(user_id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seed_hash_known_values() {
        assert_eq!(seed_hash(""), 0);
        assert_eq!(seed_hash("a"), 97);
        assert_eq!(seed_hash("ab"), 97 * 31 + 98);
        // Overflow wraps like a 32-bit integer
        assert_eq!(seed_hash("polygenelubricants"), i32::MIN);
    }

    #[test]
    fn test_hunter_name_known_values() {
        assert_eq!(hunter_name("a"), "ハンター98");
        assert_eq!(hunter_name("ab"), "ハンター3106");
        // |i32::MIN| = 2147483648; 2147483648 % 9999 = 8417
        assert_eq!(hunter_name("polygenelubricants"), "ハンター8418");
    }

    #[test]
    fn test_hunter_name_is_deterministic() {
        let id = "9f86d081884c7d659a2feaa0c55ad015a3bf4f1b2b0b822cd15d6c15b0f00a08";
        assert_eq!(hunter_name(id), hunter_name(id));
        assert_eq!(hunter_name(id), name_at(name_index(id)));
        assert!(is_alias_for(id, &hunter_name(id)));
    }

    #[test]
    fn test_name_index_in_range() {
        for i in 0..500 {
            let id = format!("user-{}", i);
            assert!(name_index(&id) < NAME_TABLE_LEN);
            assert!(is_table_name(&hunter_name(&id)));
        }
    }

    #[test]
    fn test_table_name_format() {
        assert!(is_table_name("ハンター1"));
        assert!(is_table_name("ハンター9999"));
        assert!(!is_table_name("ハンター0"));
        assert!(!is_table_name("ハンター10000"));
        assert!(!is_table_name("ハンター007"));
        assert!(!is_table_name("ハンター"));
        assert!(!is_table_name("ハンター12a"));
        assert!(!is_table_name("Bob"));
        assert!(!is_table_name("Hunter42"));
    }

    #[test]
    fn test_alias_for_other_id_is_rejected() {
        assert!(!is_alias_for("a", "ハンター99"));
        assert!(is_alias_for("a", "ハンター98"));
    }
}
