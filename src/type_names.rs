//! Memoized short type names.
//!
//! `std::any::type_name` returns fully qualified paths, which are noisy in
//! metric labels and span fields. Shortened names are computed once per
//! `TypeId` and cached for the life of the process.

use dashmap::DashMap;
use std::any::TypeId;
use std::sync::OnceLock;

static SHORT_NAMES: OnceLock<DashMap<TypeId, &'static str>> = OnceLock::new();

fn cache() -> &'static DashMap<TypeId, &'static str> {
    SHORT_NAMES.get_or_init(DashMap::new)
}

/// Short name for the type identified by `id`, whose full name is `full`.
///
/// The first call for a given `TypeId` computes the name; later calls hit
/// the cache. The shard lock is released before returning.
pub fn short_name(id: TypeId, full: &'static str) -> &'static str {
    if let Some(name) = cache().get(&id) {
        return *name;
    }
    *cache().entry(id).or_insert_with(|| {
        let short = shorten(full);
        if short == full {
            full
        } else {
            Box::leak(short.into_boxed_str())
        }
    })
}

/// Short name for `T`.
pub fn short_name_of<T: ?Sized + 'static>() -> &'static str {
    short_name(TypeId::of::<T>(), std::any::type_name::<T>())
}

/// Number of cached entries.
pub fn cached_len() -> usize {
    cache().len()
}

/// Strip module paths from every path segment in a type name.
///
/// `app::Wrapper<lib::Inner>` becomes `Wrapper<Inner>`.
fn shorten(full: &str) -> String {
    let mut out = String::with_capacity(full.len());
    // Byte offset in `out` where the current path segment starts.
    let mut segment_start = 0;
    let mut chars = full.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            ':' if chars.peek() == Some(&':') => {
                chars.next();
                out.truncate(segment_start);
            }
            '<' | '>' | ',' | ';' | '[' | ']' | '(' | ')' | '&' | '*' | '+' | ' ' => {
                out.push(c);
                segment_start = out.len();
            }
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[allow(dead_code)]
    mod nested {
        pub struct Inner;
        pub struct Wrapper<T>(pub T);
    }

    #[test]
    fn strips_module_paths() {
        assert_eq!(shorten("app::commands::DoStuff"), "DoStuff");
        assert_eq!(shorten("DoStuff"), "DoStuff");
    }

    #[test]
    fn strips_paths_inside_generics() {
        assert_eq!(
            shorten("app::Wrapper<lib::Inner, alloc::string::String>"),
            "Wrapper<Inner, String>"
        );
        assert_eq!(shorten("(app::A, &b::B)"), "(A, &B)");
        assert_eq!(shorten("[app::A; 4]"), "[A; 4]");
        assert_eq!(shorten("dyn core::any::Any + core::marker::Send"), "dyn Any + Send");
    }

    #[test]
    fn short_name_of_is_memoized() {
        let first = short_name_of::<nested::Wrapper<nested::Inner>>();
        assert_eq!(first, "Wrapper<Inner>");
        let second = short_name_of::<nested::Wrapper<nested::Inner>>();
        assert!(std::ptr::eq(first, second));
        assert!(cached_len() >= 1);
    }

    #[test]
    fn primitives_keep_their_name() {
        assert_eq!(short_name_of::<u64>(), "u64");
    }
}
