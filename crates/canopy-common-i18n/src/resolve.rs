// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Locale resolution logic.

/// Extract the primary language subtag from a platform language tag.
///
/// Accepts BCP 47 (`mr-IN`), POSIX (`hi_IN.UTF-8`, `en_US@euro`) and bare
/// (`en`) forms. The result is lowercased. Returns `None` when the tag has no
/// alphabetic primary subtag.
///
/// # Example
///
/// ```
/// use canopy_common_i18n::primary_subtag;
///
/// assert_eq!(primary_subtag("mr-IN").as_deref(), Some("mr"));
/// assert_eq!(primary_subtag("hi_IN.UTF-8").as_deref(), Some("hi"));
/// assert_eq!(primary_subtag("").as_deref(), None);
/// ```
pub fn primary_subtag(tag: &str) -> Option<String> {
	let primary = tag
		.trim()
		.split(['.', '@'])
		.next()?
		.split(['-', '_'])
		.next()?
		.trim();

	if primary.is_empty() || !primary.chars().all(|c| c.is_ascii_alphabetic()) {
		return None;
	}

	Some(primary.to_ascii_lowercase())
}

/// Resolve the effective locale from an ordered list of candidates.
///
/// The first candidate that is a member of `supported` wins; when none is,
/// `default` is returned. Callers must ensure `default` is itself a member of
/// `supported`.
///
/// # Example
///
/// ```
/// use canopy_common_i18n::resolve_locale;
///
/// let supported = ["en", "hi", "mr"];
///
/// // Earlier candidates take priority
/// assert_eq!(resolve_locale([Some("hi"), Some("mr")], &supported, "en"), "hi");
///
/// // Unsupported and missing candidates are skipped
/// assert_eq!(resolve_locale([Some("fr"), None, Some("mr")], &supported, "en"), "mr");
///
/// // Falls back to the default
/// assert_eq!(resolve_locale([Some("fr")], &supported, "en"), "en");
/// ```
pub fn resolve_locale<'a, I, S>(candidates: I, supported: &[S], default: &'a str) -> String
where
	I: IntoIterator<Item = Option<&'a str>>,
	S: AsRef<str>,
{
	candidates
		.into_iter()
		.flatten()
		.find(|candidate| supported.iter().any(|s| s.as_ref() == *candidate))
		.unwrap_or(default)
		.to_string()
}

#[cfg(test)]
mod tests {
	use super::*;
	use proptest::prelude::*;

	const SUPPORTED: [&str; 3] = ["en", "hi", "mr"];

	#[test]
	fn test_primary_subtag_forms() {
		assert_eq!(primary_subtag("mr-IN").as_deref(), Some("mr"));
		assert_eq!(primary_subtag("fr-FR").as_deref(), Some("fr"));
		assert_eq!(primary_subtag("en_US.UTF-8").as_deref(), Some("en"));
		assert_eq!(primary_subtag("de_DE@euro").as_deref(), Some("de"));
		assert_eq!(primary_subtag("zh-Hans-CN").as_deref(), Some("zh"));
		assert_eq!(primary_subtag("HI").as_deref(), Some("hi"));
		assert_eq!(primary_subtag("  en  ").as_deref(), Some("en"));
	}

	#[test]
	fn test_primary_subtag_rejects_garbage() {
		assert_eq!(primary_subtag(""), None);
		assert_eq!(primary_subtag("-IN"), None);
		assert_eq!(primary_subtag("C.UTF-8").as_deref(), Some("c"));
		assert_eq!(primary_subtag("12-34"), None);
	}

	#[test]
	fn test_first_supported_candidate_wins() {
		assert_eq!(resolve_locale([Some("hi"), Some("mr")], &SUPPORTED, "en"), "hi");
		assert_eq!(resolve_locale([None, Some("mr")], &SUPPORTED, "en"), "mr");
	}

	#[test]
	fn test_fallback_to_default() {
		assert_eq!(resolve_locale([Some("fr"), None], &SUPPORTED, "en"), "en");
		assert_eq!(resolve_locale([None, None], &SUPPORTED, "hi"), "hi");
	}

	#[test]
	fn test_empty_string_is_invalid() {
		assert_eq!(resolve_locale([Some("")], &SUPPORTED, "en"), "en");
	}

	proptest! {
		#[test]
		fn prop_result_is_always_supported(
			a in proptest::option::of("[a-z]{0,3}"),
			b in proptest::option::of("[a-z]{0,3}"),
			default_idx in 0usize..3,
		) {
			let default = SUPPORTED[default_idx];
			let resolved = resolve_locale([a.as_deref(), b.as_deref()], &SUPPORTED, default);
			prop_assert!(SUPPORTED.contains(&resolved.as_str()));
		}

		#[test]
		fn prop_subtag_is_lowercase_alpha(tag in "[A-Za-z]{1,8}([-_][A-Za-z0-9]{1,8}){0,2}") {
			let primary = primary_subtag(&tag).unwrap();
			prop_assert!(primary.chars().all(|c| c.is_ascii_lowercase()));
			prop_assert!(tag.to_ascii_lowercase().starts_with(&primary));
		}
	}
}
