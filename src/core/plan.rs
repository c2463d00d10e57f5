//! # Execution Plan Module / 执行计划模块
//!
//! The declared-suite-vs-scan decision, the declared (suite-file) plan itself,
//! and the rerun expansion used for external enumeration.
//!
//! An explicit suite file already encodes exact test membership; a specific
//! per-test name filter is a finer-grained override the suite format cannot
//! honor, so its presence forces the scan path even when suite files are
//! configured.
//!
//! 声明套件与扫描之间的决策、声明（套件文件）计划本身，
//! 以及用于外部枚举的重跑展开。
//!
//! 显式套件文件已经编码了确切的测试成员；特定的按测试名称过滤器是
//! 套件格式无法表达的更细粒度覆盖，因此它的存在会强制走扫描路径，
//! 即使配置了套件文件。

use crate::core::config::{ProviderConfig, TestRequest};
use crate::core::execution::{run_single_class, TestClassRunner};
use crate::core::models::{TestClass, TestSetFailure};
use crate::reporting::Reporter;
use anyhow::{anyhow, Context, Result};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::fs;
use std::path::PathBuf;

/// Decision rule for plan resolution: a declared suite governs the run iff at
/// least one suite file is configured and the filter selects no specific
/// tests. Everything else goes through the classpath scan.
pub fn is_declared_suite_run(request: &TestRequest) -> bool {
    !request.suite_files.is_empty() && !request.filter.has_specific_tests()
}

/// Expands a resolved, ordered class sequence for external enumeration: each
/// class appears `rerun_count + 1` times consecutively, preserving the
/// relative order of distinct classes.
///
/// This answers the host's "how many executions to expect" query only. The
/// execution path runs the plan exactly once per invocation; repetition across
/// runs is orchestrated by the host issuing multiple invocations.
pub fn expand_reruns(classes: &[TestClass], rerun_count: u32) -> Vec<TestClass> {
    let copies = rerun_count as usize + 1;
    let mut expanded = Vec::with_capacity(classes.len() * copies);
    for class in classes {
        for _ in 0..copies {
            expanded.push(class.clone());
        }
    }
    expanded
}

/// On-disk shape of a suite-descriptor file.
/// 套件描述文件的磁盘结构。
#[derive(Debug, Deserialize)]
struct SuiteFile {
    #[allow(dead_code)]
    #[serde(default)]
    name: Option<String>,
    #[serde(rename = "test-set", default)]
    test_sets: Vec<TestSetDef>,
}

#[derive(Debug, Deserialize)]
struct TestSetDef {
    name: String,
    classes: Vec<String>,
}

/// A named grouping of test classes located from a suite file.
#[derive(Debug, Clone)]
pub struct LocatedTestSet {
    pub name: String,
    pub classes: Vec<TestClass>,
}

/// The plan backed by explicit, externally-authored suite files. It owns its
/// own membership and internal ordering; the orchestrator only locates the
/// test sets and drives execution.
///
/// 由显式的、外部编写的套件文件支撑的计划。它拥有自己的成员和内部顺序；
/// 编排器只负责定位测试集并驱动执行。
#[derive(Debug)]
pub struct DeclaredSuite {
    suite_files: Vec<PathBuf>,
    test_source_directory: PathBuf,
    properties: BTreeMap<String, String>,
    reports_directory: PathBuf,
    skip_after_failure_count: u32,
    located: Option<Vec<LocatedTestSet>>,
}

impl DeclaredSuite {
    pub fn new(request: &TestRequest, config: &ProviderConfig) -> Self {
        Self {
            suite_files: request.suite_files.clone(),
            test_source_directory: request.test_source_directory.clone(),
            properties: config.provider_properties.clone(),
            reports_directory: config.reports_directory.clone(),
            skip_after_failure_count: config.skip_after_failure_count,
            located: None,
        }
    }

    pub fn properties(&self) -> &BTreeMap<String, String> {
        &self.properties
    }

    pub fn reports_directory(&self) -> &PathBuf {
        &self.reports_directory
    }

    /// Parses and validates every configured suite file. Fails on an
    /// unreadable or malformed file, a suite without test sets, a set without
    /// classes, a missing test source root, or a repeated locate call.
    pub fn locate_test_sets(&mut self) -> Result<&[LocatedTestSet], TestSetFailure> {
        if self.located.is_some() {
            return Err(TestSetFailure::configuration(anyhow!(
                "test sets were already located"
            )));
        }
        if !self.test_source_directory.is_dir() {
            return Err(TestSetFailure::configuration(anyhow!(
                "test source directory not found: {}",
                self.test_source_directory.display()
            )));
        }

        let mut located = Vec::new();
        for file in &self.suite_files {
            let sets = locate_sets_in_file(file).map_err(TestSetFailure::configuration)?;
            located.extend(sets);
        }

        self.located = Some(located);
        Ok(self.located.as_deref().unwrap_or_default())
    }

    /// Runs every located test set in order. The process-wide skip flag and
    /// the fail-fast threshold are observed before each class, exactly as on
    /// the scan path.
    pub fn execute(
        &self,
        engine: &dyn TestClassRunner,
        reporter: &mut dyn Reporter,
    ) -> Result<()> {
        let located = self
            .located
            .as_deref()
            .context("execute called before test sets were located")?;

        // The suite format cannot carry a per-test filter; the empty filter is
        // what the engine receives here.
        let filter = crate::core::filter::TestFilter::empty();

        let mut failures = 0u32;
        for set in located {
            reporter.test_set_starting(&set.name);
            for class in &set.classes {
                run_single_class(
                    class,
                    &filter,
                    engine,
                    reporter,
                    &mut failures,
                    self.skip_after_failure_count,
                )?;
            }
            reporter.test_set_completed(&set.name);
        }
        Ok(())
    }
}

fn locate_sets_in_file(file: &PathBuf) -> Result<Vec<LocatedTestSet>> {
    let content = fs::read_to_string(file)
        .with_context(|| format!("failed to read suite file: {}", file.display()))?;
    let suite: SuiteFile = toml::from_str(&content)
        .with_context(|| format!("malformed suite file: {}", file.display()))?;

    if suite.test_sets.is_empty() {
        anyhow::bail!("suite file declares no test sets: {}", file.display());
    }

    let mut located = Vec::with_capacity(suite.test_sets.len());
    for set in suite.test_sets {
        if set.classes.is_empty() {
            anyhow::bail!(
                "test set '{}' declares no classes: {}",
                set.name,
                file.display()
            );
        }
        located.push(LocatedTestSet {
            name: set.name,
            classes: set.classes.into_iter().map(TestClass::new).collect(),
        });
    }
    Ok(located)
}
