//! Deterministic 32-bit string hash shared by every mock generator.
//!
//! Rolling multiply-xor over UTF-16 code units, seeded with 5381. Stable
//! across runs and platforms; not cryptographic.

const SEED: u32 = 5381;

pub fn hash_str(input: &str) -> u32 {
    input.encode_utf16().fold(SEED, |h, unit| {
        h.wrapping_shl(5).wrapping_add(h) ^ u32::from(unit)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_string_is_seed() {
        assert_eq!(hash_str(""), 5381);
    }

    #[test]
    fn known_values() {
        assert_eq!(hash_str("a"), 177_604);
        assert_eq!(hash_str("chicken"), 3_832_410_564);
        assert_eq!(hash_str("meal.jpg"), 1_591_230_163);
    }

    #[test]
    fn deterministic() {
        for s in ["", "rice", "Grilled Chicken", "ünïcødé 🍗"] {
            assert_eq!(hash_str(s), hash_str(s));
        }
    }

    #[test]
    fn distinct_inputs_differ() {
        assert_ne!(hash_str("rice"), hash_str("ricf"));
        assert_ne!(hash_str("ab"), hash_str("ba"));
    }
}
