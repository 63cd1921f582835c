//! Client-side filters for the admin course and user tables.
//!
//! All matching is case-insensitive substring search on trimmed input; an
//! empty criterion matches everything.

#[cfg(test)]
#[path = "filters_test.rs"]
mod filters_test;

use crate::net::types::{Course, Role, User};

fn contains(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(needle)
}

fn needle(raw: &str) -> String {
    raw.trim().to_lowercase()
}

/// Courses whose code, name, or department contains `search`.
#[must_use]
pub fn filter_courses<'a>(courses: &'a [Course], search: &str) -> Vec<&'a Course> {
    let needle = needle(search);
    courses
        .iter()
        .filter(|c| {
            needle.is_empty()
                || contains(&c.course_code, &needle)
                || contains(&c.course_name, &needle)
                || contains(&c.department, &needle)
        })
        .collect()
}

/// Criteria for the admin user table.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct UserFilter {
    /// Matched against name and email.
    pub search: String,
    pub department: Option<String>,
    pub batch_year: Option<String>,
    pub role: Option<Role>,
}

impl UserFilter {
    #[must_use]
    pub fn matches(&self, user: &User) -> bool {
        let search = needle(&self.search);
        if !search.is_empty() && !contains(&user.name, &search) && !contains(&user.email, &search) {
            return false;
        }
        if let Some(department) = self.department.as_deref().map(str::trim).filter(|d| !d.is_empty()) {
            if !user.department.as_deref().is_some_and(|d| d.eq_ignore_ascii_case(department)) {
                return false;
            }
        }
        if let Some(batch) = self.batch_year.as_deref().map(str::trim).filter(|b| !b.is_empty()) {
            if user.batch_year.as_deref().map(str::trim) != Some(batch) {
                return false;
            }
        }
        self.role.is_none_or(|role| user.role == role)
    }

    #[must_use]
    pub fn apply<'a>(&self, users: &'a [User]) -> Vec<&'a User> {
        users.iter().filter(|u| self.matches(u)).collect()
    }
}

/// Distinct, sorted values for a filter dropdown.
#[must_use]
pub fn distinct_values<'a>(values: impl IntoIterator<Item = Option<&'a str>>) -> Vec<String> {
    let mut out: Vec<String> = values
        .into_iter()
        .flatten()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_owned)
        .collect();
    out.sort();
    out.dedup();
    out
}
