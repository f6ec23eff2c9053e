//! Account codes double as tree paths: a code's parent is the code with
//! its last digit removed, so every structural rule reduces to prefix
//! arithmetic over the flat set of registered codes.

use std::collections::BTreeMap;
use std::ops::Bound;

use log::debug;

use crate::error::CodeError;

pub const MAX_CODE_LEN: usize = 5;

/// Snapshot of the chart of accounts: code to title.
pub type Registry = BTreeMap<String, String>;

/// Validate a new or renamed account code against a registry snapshot.
///
/// `original` is the account's current code when editing, or empty when
/// creating. Returns the trimmed code on success. Checks short-circuit on
/// the first failure.
pub fn validate(proposed: &str, original: &str, registry: &Registry) -> Result<String, CodeError> {
    validate_all(proposed, original, registry).map_err(|errors| errors[0].clone())
}

/// Like [`validate`], but reports every structural failure at once, in
/// check order, so a form can show them together. Format failures
/// (empty, bad characters, too long) are still reported alone.
pub fn validate_all(
    proposed: &str,
    original: &str,
    registry: &Registry,
) -> Result<String, Vec<CodeError>> {
    let code = proposed.trim();
    let original = original.trim();

    check_format(code).map_err(|e| vec![e])?;

    if !original.is_empty() && code == original {
        return Ok(code.to_string());
    }

    let mut errors = Vec::new();

    if !original.is_empty() && code.starts_with(original) {
        errors.push(CodeError::CodeUnderSelf);
    }
    if registry.contains_key(code) {
        errors.push(CodeError::CodeInUse);
    }
    if let Some(parent) = parent_code(code) {
        if !registry.contains_key(parent) {
            errors.push(CodeError::ParentNotFound);
        }
    }
    if !original.is_empty()
        && descendants(registry, original)
            .any(|d| d.len() - original.len() + code.len() > MAX_CODE_LEN)
    {
        errors.push(CodeError::DescendantCodeTooLong);
    }

    if errors.is_empty() {
        Ok(code.to_string())
    } else {
        debug!("rejecting code {code} (was {original:?}): {errors:?}");
        Err(errors)
    }
}

fn check_format(code: &str) -> Result<(), CodeError> {
    if code.is_empty() {
        return Err(CodeError::EmptyCode);
    }
    if !code.bytes().all(|b| b.is_ascii_digit()) || code.starts_with('0') {
        return Err(CodeError::InvalidCharacters);
    }
    if code.len() > MAX_CODE_LEN {
        return Err(CodeError::CodeTooLong);
    }
    Ok(())
}

/// The parent's code, or `None` for a topmost account.
pub fn parent_code(code: &str) -> Option<&str> {
    let mut chars = code.char_indices();
    let (last, _) = chars.next_back()?;
    if last == 0 {
        None
    } else {
        Some(&code[..last])
    }
}

/// Whether `code` sits strictly below `ancestor`.
pub fn is_descendant(code: &str, ancestor: &str) -> bool {
    code.len() > ancestor.len() && code.starts_with(ancestor)
}

/// Registered codes strictly below `code`, in code order.
pub fn descendants<'a>(registry: &'a Registry, code: &'a str) -> impl Iterator<Item = &'a str> + 'a {
    registry
        .range::<str, _>((Bound::Included(code), Bound::Unbounded))
        .map(|(c, _)| c.as_str())
        .take_while(move |c| c.starts_with(code))
        .filter(move |c| c.len() > code.len())
}

/// Parent accounts are summaries of their subtree and never take records.
pub fn is_parent_account(registry: &Registry, code: &str) -> bool {
    descendants(registry, code).next().is_some()
}

/// The code a descendant ends up with when `original` is renamed to `proposed`.
pub fn renamed_code(code: &str, original: &str, proposed: &str) -> Option<String> {
    code.strip_prefix(original).map(|rest| format!("{proposed}{rest}"))
}
