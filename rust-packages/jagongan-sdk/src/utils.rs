//! Display helpers.

use solana_program::native_token::LAMPORTS_PER_SOL;

/// Shorten a long string to `head..tail`, keeping `len` chars on each side.
pub fn ellipsify(s: &str, len: usize) -> String {
    const DELIMITER: &str = "..";
    let chars: Vec<char> = s.chars().collect();
    if chars.len() < len * 2 + DELIMITER.len() {
        return s.to_string();
    }
    let head: String = chars[..len].iter().collect();
    let tail: String = chars[chars.len() - len..].iter().collect();
    format!("{}{}{}", head, DELIMITER, tail)
}

/// Lamports as SOL with four decimals.
pub fn format_sol(lamports: u64) -> String {
    format!("{:.4}", lamports as f64 / LAMPORTS_PER_SOL as f64)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ellipsify() {
        assert_eq!(
            ellipsify("47ofz98ZHkDxec7pBjBqPwq2VqhpK4h1BDhLa8h7zZWb", 4),
            "47of..zZWb"
        );
        assert_eq!(ellipsify("short", 4), "short");
        assert_eq!(ellipsify("abcdefghij", 4), "abcd..ghij");
    }

    #[test]
    fn test_format_sol() {
        assert_eq!(format_sol(12_500_000), "0.0125");
        assert_eq!(format_sol(0), "0.0000");
    }
}
