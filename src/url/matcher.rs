/// Checks if a host belongs to a base domain
///
/// A host matches when it is the base domain itself or any subdomain of it.
/// The comparison respects label boundaries, so `notupi.edu` does not match
/// `upi.edu`.
///
/// # Examples
///
/// ```
/// use sitescope::url::matches_domain;
///
/// assert!(matches_domain("upi.edu", "upi.edu"));
/// assert!(matches_domain("upi.edu", "pddikti.upi.edu"));
/// assert!(!matches_domain("upi.edu", "upi.edu.evil.com"));
/// assert!(!matches_domain("upi.edu", "notupi.edu"));
/// ```
pub fn matches_domain(base_domain: &str, candidate: &str) -> bool {
    if base_domain.is_empty() {
        return false;
    }

    candidate == base_domain
        || candidate
            .strip_suffix(base_domain)
            .is_some_and(|prefix| prefix.ends_with('.'))
}
