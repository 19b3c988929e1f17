use proc_macro::TokenStream;
use proc_macro2::Span;
use quote::quote;
use syn::{Ident, ItemFn, parse_macro_input};

const CHUNK_BITS: usize = u64::BITS as usize;

/// Builds a `u64` chunk value from a visual picture of its rows.
///
/// Rows are written top to bottom, so the last line is row slot 0 (the lowest
/// row of the chunk). Within a line the leftmost character is column 0, which
/// lands in the lowest bit of its row slot. The row width is the length of
/// the lines; every line must have the same length and only `0`/`1`
/// characters. Fewer lines than a chunk holds leaves the upper slots empty.
///
/// # Example
///
/// ```
/// use proc_macros::chunk_rows;
///
/// let chunk: u64 = chunk_rows! {
///     0000000001
///     1111111111
/// };
/// assert_eq!(chunk, 0x3ff | (1 << 19));
/// ```
#[proc_macro]
pub fn chunk_rows(input: TokenStream) -> TokenStream {
    let input = input.to_string();
    let lines: Vec<&str> = input.split_whitespace().collect();

    match pack_rows(&lines) {
        Ok(value) => quote! { #value }.into(),
        Err(msg) => syn::Error::new(Span::call_site(), msg)
            .to_compile_error()
            .into(),
    }
}

fn pack_rows(lines: &[&str]) -> Result<u64, String> {
    let Some(first) = lines.first() else {
        return Err("chunk_rows! needs at least one row".to_string());
    };
    let width = first.len();
    if width == 0 || width > CHUNK_BITS {
        return Err(format!("row width {width} does not fit a {CHUNK_BITS}-bit chunk"));
    }
    if let Some(bad) = lines.iter().find(|line| line.len() != width) {
        return Err(format!(
            "row `{bad}` has {} columns, expected {width}",
            bad.len()
        ));
    }
    if lines.len() * width > CHUNK_BITS {
        return Err(format!(
            "{} rows of width {width} do not fit a {CHUNK_BITS}-bit chunk",
            lines.len()
        ));
    }

    let mut value = 0u64;
    for (slot, line) in lines.iter().rev().enumerate() {
        for (col, ch) in line.chars().enumerate() {
            match ch {
                '1' => value |= 1u64 << (slot * width + col),
                '0' => {}
                other => return Err(format!("unexpected cell `{other}` in row `{line}`")),
            }
        }
    }
    Ok(value)
}

/// Inline hint that can be switched off for profiling.
///
/// With the `never-inline` feature of the calling crate enabled, every
/// annotated function becomes `#[inline(never)]` so it shows up as its own
/// frame in flamegraphs.
///
/// - `#[inline_conditioned]` → `#[inline]`
/// - `#[inline_conditioned(always)]` → `#[inline(always)]`
/// - `#[inline_conditioned(never)]` → `#[inline(never)]` unconditionally
#[proc_macro_attribute]
pub fn inline_conditioned(attr: TokenStream, item: TokenStream) -> TokenStream {
    let item_fn = parse_macro_input!(item as ItemFn);

    let hint = if attr.is_empty() {
        None
    } else {
        Some(parse_macro_input!(attr as Ident))
    };

    let expanded = match hint.as_ref().map(|ident| ident.to_string()).as_deref() {
        None => quote! {
            #[cfg_attr(not(feature = "never-inline"), inline)]
            #[cfg_attr(feature = "never-inline", inline(never))]
            #item_fn
        },
        Some("always") => quote! {
            #[cfg_attr(not(feature = "never-inline"), inline(always))]
            #[cfg_attr(feature = "never-inline", inline(never))]
            #item_fn
        },
        Some("never") => quote! {
            #[inline(never)]
            #item_fn
        },
        Some(other) => {
            return syn::Error::new_spanned(
                &hint,
                format!("unknown inline hint `{other}`, expected `always` or `never`"),
            )
            .to_compile_error()
            .into();
        }
    };

    expanded.into()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pack_rows_bottom_line_is_slot_zero() {
        let value = pack_rows(&["0000000001", "1111111111"]).unwrap();
        assert_eq!(value, 0x3ff | (1 << 19));
    }

    #[test]
    fn test_pack_rows_column_zero_is_low_bit() {
        assert_eq!(pack_rows(&["1000"]).unwrap(), 0b0001);
        assert_eq!(pack_rows(&["0001"]).unwrap(), 0b1000);
    }

    #[test]
    fn test_pack_rows_rejects_bad_input() {
        assert!(pack_rows(&[]).is_err());
        assert!(pack_rows(&["101", "10"]).is_err());
        assert!(pack_rows(&["102"]).is_err());
        let too_many = ["11111111111"; 6];
        assert!(pack_rows(&too_many).is_err());
    }
}
