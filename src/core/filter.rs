//! # Name Filter Module / 名称过滤器模块
//!
//! This module evaluates the configured set of include/exclude test-name
//! patterns. A filter decides whether it selects "specific" tests (and thereby
//! forces the scan path even when suite files are configured) or matches
//! everything, in which case it collapses to the canonical empty filter.
//!
//! 此模块评估配置的包含/排除测试名称模式集合。
//! 过滤器决定它是否选择"特定"测试（从而即使配置了套件文件也强制走扫描路径），
//! 或者匹配所有测试，此时它会折叠为规范的空过滤器。

use anyhow::{Context, Result};
use globset::{Glob, GlobMatcher};
use std::fmt;

/// One `Class#method` pattern. Either half may be omitted or wildcarded;
/// matching uses glob semantics (`*`, `?`, `[...]`).
/// 一个 `Class#method` 模式。任一半都可以省略或使用通配符；
/// 匹配使用 glob 语义（`*`、`?`、`[...]`）。
#[derive(Debug, Clone)]
pub struct TestPattern {
    raw: String,
    class: Option<GlobMatcher>,
    method: Option<GlobMatcher>,
    exclude: bool,
}

impl TestPattern {
    fn parse(raw: &str) -> Result<Self> {
        let (exclude, body) = match raw.strip_prefix('!') {
            Some(rest) => (true, rest.trim()),
            None => (false, raw),
        };

        let (class_part, method_part) = match body.split_once('#') {
            Some((class, method)) => (class.trim(), Some(method.trim())),
            None => (body, None),
        };

        let class = compile_part(class_part)
            .with_context(|| format!("invalid class pattern in '{raw}'"))?;
        let method = match method_part {
            Some(part) => compile_part(part)
                .with_context(|| format!("invalid method pattern in '{raw}'"))?,
            None => None,
        };

        Ok(Self {
            raw: raw.to_string(),
            class,
            method,
            exclude,
        })
    }

    /// `true` when the pattern cannot reject anything: no class constraint,
    /// no method constraint, and it is not an exclusion.
    pub fn matches_everything(&self) -> bool {
        !self.exclude && self.class.is_none() && self.method.is_none()
    }

    pub fn is_exclusion(&self) -> bool {
        self.exclude
    }

    /// Matches a class name and, if known, a method name. A pattern that
    /// names a method still matches the bare class (the class may contain
    /// matching methods; method-level selection is the engine's job).
    pub fn matches(&self, class: &str, method: Option<&str>) -> bool {
        if let Some(class_glob) = &self.class {
            if !class_glob.is_match(class) {
                return false;
            }
        }
        match (&self.method, method) {
            (Some(method_glob), Some(method)) => method_glob.is_match(method),
            _ => true,
        }
    }
}

impl fmt::Display for TestPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

/// Compiles one half of a pattern. Blank or pure-wildcard parts mean
/// "no constraint" and compile to `None`.
fn compile_part(part: &str) -> Result<Option<GlobMatcher>> {
    if part.is_empty() || part == "*" || part == "**" {
        return Ok(None);
    }
    let matcher = Glob::new(part)?.compile_matcher();
    Ok(Some(matcher))
}

/// The configured collection of test-name patterns.
///
/// A filter is either empty (matches everything, semantically "no filter") or
/// holds at least one concrete pattern. A filter whose patterns all match
/// everything is *wildcard* and is normalized to the empty filter before it is
/// handed to execution, so "no filter" and "wildcard filter" are
/// indistinguishable downstream.
///
/// 配置的测试名称模式集合。
///
/// 过滤器要么为空（匹配所有，语义上等同于"无过滤器"），
/// 要么持有至少一个具体模式。所有模式都匹配一切的过滤器是*通配*的，
/// 在交给执行之前会被规范化为空过滤器，
/// 因此"无过滤器"和"通配过滤器"在下游无法区分。
#[derive(Debug, Clone, Default)]
pub struct TestFilter {
    included: Vec<TestPattern>,
    excluded: Vec<TestPattern>,
}

impl TestFilter {
    /// The canonical empty filter.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Parses a comma-separated pattern specification, e.g.
    /// `"AccountTest, Ledger*#credit_*, !SlowTest"`. Blank entries are
    /// ignored; a blank specification yields the empty filter.
    pub fn from_spec(spec: &str) -> Result<Self> {
        let mut included = Vec::new();
        let mut excluded = Vec::new();

        for entry in spec.split(',') {
            let entry = entry.trim();
            if entry.is_empty() {
                continue;
            }
            let pattern = TestPattern::parse(entry)?;
            if pattern.is_exclusion() {
                excluded.push(pattern);
            } else {
                included.push(pattern);
            }
        }

        Ok(Self { included, excluded })
    }

    /// `true` when the filter holds no patterns at all.
    pub fn is_empty(&self) -> bool {
        self.included.is_empty() && self.excluded.is_empty()
    }

    /// `true` when the filter matches every test: it is empty, or every
    /// inclusion matches everything and there are no exclusions.
    pub fn is_wildcard(&self) -> bool {
        self.excluded.is_empty()
            && self
                .included
                .iter()
                .all(TestPattern::matches_everything)
    }

    /// A filter selects specific tests when it is non-empty and non-wildcard.
    /// This single predicate gates the declared-suite-vs-scan decision.
    pub fn has_specific_tests(&self) -> bool {
        !self.is_empty() && !self.is_wildcard()
    }

    pub fn matches(&self, class: &str, method: Option<&str>) -> bool {
        if self
            .excluded
            .iter()
            .any(|pattern| pattern.matches(class, method))
        {
            return false;
        }
        self.included.is_empty()
            || self
                .included
                .iter()
                .any(|pattern| pattern.matches(class, method))
    }

    /// Collapses a wildcard filter to the canonical empty filter; a specific
    /// filter is returned unchanged.
    pub fn normalized(&self) -> TestFilter {
        if self.is_wildcard() {
            TestFilter::empty()
        } else {
            self.clone()
        }
    }
}

impl fmt::Display for TestFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for pattern in self.included.iter().chain(self.excluded.iter()) {
            if !first {
                f.write_str(", ")?;
            }
            write!(f, "{pattern}")?;
            first = false;
        }
        Ok(())
    }
}
