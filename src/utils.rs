/// Removes all whitespace from `text`, used when building map queries.
pub fn strip_whitespace(text: &str) -> String {
    text.chars().filter(|c| !c.is_whitespace()).collect()
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_whitespace() {
        assert_eq!(strip_whitespace(" 37.8, -122.4 \t"), "37.8,-122.4");
        assert_eq!(strip_whitespace(""), "");
    }
}
