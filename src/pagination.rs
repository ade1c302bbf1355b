//! Fixed-size character pagination
//!
//! Pages are 1-indexed and measured in chars, not bytes, so multi-byte text
//! is never split inside a character.

use crate::error::{ReaderError, Result};

/// Largest page size accepted by configuration
pub const MAX_PAGE_SIZE: usize = 1000;

/// Default page size
pub const DEFAULT_PAGE_SIZE: usize = 30;

/// Number of pages needed for `text`. Zero for empty text.
pub fn total_pages(text: &str, page_size: usize) -> Result<usize> {
    if page_size == 0 {
        return Err(ReaderError::InvalidConfig(
            "page size must be at least 1".to_string(),
        ));
    }

    Ok(text.chars().count().div_ceil(page_size))
}

/// Content of `page`, or an empty slice when the page starts past the end
///
/// Does not validate `page` against [`total_pages`]; page 0 yields an empty
/// slice.
pub fn page_content(text: &str, page: usize, page_size: usize) -> &str {
    if page == 0 || page_size == 0 {
        return "";
    }

    let start_char = (page - 1).saturating_mul(page_size);
    let mut boundaries = text.char_indices().map(|(i, _)| i).skip(start_char);

    let Some(start) = boundaries.next() else {
        return "";
    };
    let end = boundaries.nth(page_size - 1).unwrap_or(text.len());

    &text[start..end]
}

/// Page containing the char at `offset`
pub fn page_of_offset(offset: usize, page_size: usize) -> usize {
    offset / page_size.max(1) + 1
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_total_pages() {
        assert_eq!(total_pages("", 3).unwrap(), 0);
        assert_eq!(total_pages("0123456789", 3).unwrap(), 4);
        assert_eq!(total_pages("012345", 3).unwrap(), 2);
        assert_eq!(total_pages("a", 30).unwrap(), 1);
    }

    #[test]
    fn test_total_pages_rejects_zero_page_size() {
        assert!(matches!(
            total_pages("abc", 0),
            Err(ReaderError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_page_content() {
        let text = "0123456789";
        assert_eq!(page_content(text, 1, 3), "012");
        assert_eq!(page_content(text, 2, 3), "345");
        assert_eq!(page_content(text, 3, 3), "678");
        assert_eq!(page_content(text, 4, 3), "9");
        assert_eq!(page_content(text, 5, 3), "");
        assert_eq!(page_content(text, 0, 3), "");
        assert_eq!(page_content("", 1, 3), "");
    }

    #[test]
    fn test_pages_reconstruct_text() {
        let texts = ["", "a", "0123456789", "长亭外，古道边，芳草碧连天。", "mixed 文字 text\nwith lines"];
        for text in texts {
            for page_size in 1..=7 {
                let pages = total_pages(text, page_size).unwrap();
                let rebuilt: String = (1..=pages)
                    .map(|p| page_content(text, p, page_size))
                    .collect();
                assert_eq!(rebuilt, text, "page_size {page_size}");
            }
        }
    }

    #[test]
    fn test_multibyte_pages_split_on_chars() {
        let text = "你好世界";
        assert_eq!(total_pages(text, 3).unwrap(), 2);
        assert_eq!(page_content(text, 1, 3), "你好世");
        assert_eq!(page_content(text, 2, 3), "界");
    }

    #[test]
    fn test_page_of_offset() {
        assert_eq!(page_of_offset(0, 3), 1);
        assert_eq!(page_of_offset(2, 3), 1);
        assert_eq!(page_of_offset(3, 3), 2);
        assert_eq!(page_of_offset(9, 3), 4);
    }
}
