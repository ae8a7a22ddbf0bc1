use anyhow::{Result, bail};
use std::collections::HashSet;

/// Seed used when the CLI is given no seeds at all.
pub const DEFAULT_SEED: u64 = 1337;

/// Resolve CLI seed arguments into distinct numeric seeds, keeping input order.
pub fn resolve_seed_inputs(tokens: &[String]) -> Result<Vec<u64>> {
    let mut deduped: Vec<u64> = Vec::new();
    let mut seen: HashSet<u64> = HashSet::new();

    for token in tokens {
        let token = token.trim();
        if token.is_empty() {
            continue;
        }

        let seed = if let Ok(value) = token.parse::<i64>() {
            value.unsigned_abs()
        } else if let Ok(value) = token.parse::<u64>() {
            value
        } else {
            bail!("Unrecognized seed token: {token}");
        };

        if seen.insert(seed) {
            deduped.push(seed);
        }
    }

    if deduped.is_empty() {
        deduped.push(DEFAULT_SEED);
    }

    Ok(deduped)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolves_and_dedupes_numeric_seeds() {
        let raw = vec![
            "42".to_string(),
            "-7".to_string(),
            "18446744073709551615".to_string(),
            " 42 ".to_string(),
        ];
        let seeds = resolve_seed_inputs(&raw).unwrap();
        assert_eq!(seeds, vec![42, 7, u64::MAX]);
    }

    #[test]
    fn rejects_non_numeric_tokens() {
        assert!(resolve_seed_inputs(&["MZ-RAIN42".to_string()]).is_err());
        assert!(resolve_seed_inputs(&["banana".to_string()]).is_err());
    }

    #[test]
    fn defaults_when_empty() {
        assert_eq!(resolve_seed_inputs(&[]).unwrap(), vec![DEFAULT_SEED]);
        assert_eq!(resolve_seed_inputs(&[String::new()]).unwrap(), vec![DEFAULT_SEED]);
    }
}
